//! The shared credentials file (`~/.aws/credentials`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Credentials, CredentialsError, ProvideCredentials};

/// `AWS_SHARED_CREDENTIALS_FILE`, else `~/.aws/credentials`.
pub fn shared_credentials_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var("AWS_SHARED_CREDENTIALS_FILE")
        .ok()
        .filter(|p| !p.trim().is_empty())
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".aws").join("credentials"))
}

/// Parse INI text into sections in file order.
///
/// `[profile name]` headers (config-file style) are normalized to `name`.
/// Repeated sections are merged; later keys win. `#` and `;` start comments.
pub fn parse_ini(content: &str) -> Vec<(String, BTreeMap<String, String>)> {
    let mut sections: Vec<(String, BTreeMap<String, String>)> = Vec::new();
    let mut current: Option<usize> = None;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let header = header.trim();
            let name = header
                .strip_prefix("profile ")
                .map(str::trim)
                .unwrap_or(header)
                .to_string();
            current = Some(match sections.iter().position(|(n, _)| *n == name) {
                Some(i) => i,
                None => {
                    sections.push((name, BTreeMap::new()));
                    sections.len() - 1
                }
            });
            continue;
        }

        let (Some(idx), Some((key, value))) = (current, line.split_once('=')) else {
            continue;
        };
        sections[idx]
            .1
            .insert(key.trim().to_lowercase(), value.trim().to_string());
    }

    sections
}

fn read_file(path: &Path) -> Result<Option<String>, CredentialsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Profile names in `path`, in file order. A missing file has none.
pub fn list_profiles(path: &Path) -> Result<Vec<String>, CredentialsError> {
    Ok(read_file(path)?
        .map(|content| parse_ini(&content).into_iter().map(|(name, _)| name).collect())
        .unwrap_or_default())
}

/// Reads the file on every call, so edits are seen after a cache refresh.
#[derive(Debug, Clone)]
pub struct ProfileFileProvider {
    path: Option<PathBuf>,
}

impl ProfileFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn from_env() -> Self {
        Self {
            path: shared_credentials_path(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl ProvideCredentials for ProfileFileProvider {
    fn name(&self) -> &'static str {
        "shared-credentials-file"
    }

    fn provide(&self, profile: &str) -> Result<Option<Credentials>, CredentialsError> {
        let Some(ref path) = self.path else {
            return Ok(None);
        };
        let Some(content) = read_file(path)? else {
            debug!(path = %path.display(), "no shared credentials file");
            return Ok(None);
        };

        let Some((_, section)) = parse_ini(&content).into_iter().find(|(n, _)| n == profile)
        else {
            return Ok(None);
        };

        let field = |key: &'static str| {
            section
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| CredentialsError::Incomplete {
                    profile: profile.to_string(),
                    field: key,
                })
        };

        Ok(Some(Credentials {
            access_key_id: field("aws_access_key_id")?,
            secret_access_key: field("aws_secret_access_key")?,
            session_token: section
                .get("aws_session_token")
                .filter(|v| !v.is_empty())
                .cloned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# comment
[default]
aws_access_key_id = AKIDDEFAULT
aws_secret_access_key = secret-default

[profile dev]
aws_access_key_id=AKIDDEV
aws_secret_access_key=secret-dev
aws_session_token = tok-dev
; trailing comment

[broken]
aws_access_key_id = AKIDBROKEN
";

    #[test]
    fn parse_keeps_file_order() {
        let names: Vec<_> = parse_ini(SAMPLE).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["default", "dev", "broken"]);
    }

    #[test]
    fn provider_reads_named_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        std::fs::write(&path, SAMPLE).unwrap();
        let provider = ProfileFileProvider::new(&path);

        let dev = provider.provide("dev").unwrap().unwrap();
        assert_eq!(dev.access_key_id, "AKIDDEV");
        assert_eq!(dev.session_token.as_deref(), Some("tok-dev"));
        assert!(provider.provide("missing").unwrap().is_none());
    }

    #[test]
    fn incomplete_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials");
        std::fs::write(&path, SAMPLE).unwrap();

        let err = ProfileFileProvider::new(&path).provide("broken").unwrap_err();
        assert!(matches!(
            err,
            CredentialsError::Incomplete {
                field: "aws_secret_access_key",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_has_no_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        assert!(list_profiles(&path).unwrap().is_empty());
        assert!(ProfileFileProvider::new(&path)
            .provide("default")
            .unwrap()
            .is_none());
    }
}
