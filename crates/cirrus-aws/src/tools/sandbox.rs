//! Restricts file tools to one directory tree.

use std::path::{Component, Path, PathBuf};

/// Path components that are never readable, wherever the sandbox is rooted.
const BLOCKED_COMPONENTS: &[&str] = &[".ssh", ".aws", ".gnupg", ".env"];

/// Absolute paths that are never readable.
const BLOCKED_PATHS: &[&str] = &["/etc/passwd", "/etc/shadow"];

#[derive(Debug, Clone)]
pub struct FileSandbox {
    root: PathBuf,
}

impl FileSandbox {
    /// Root the sandbox at `root`, which must exist.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            root: std::fs::canonicalize(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` (relative paths start at the root) to an existing,
    /// canonical location inside the sandbox.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, String> {
        let requested = Path::new(path);
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let canonical = std::fs::canonicalize(&joined)
            .map_err(|e| format!("cannot resolve path '{path}': {e}"))?;

        if !canonical.starts_with(&self.root) {
            return Err(format!(
                "Access denied: path '{}' is outside sandbox '{}'",
                canonical.display(),
                self.root.display()
            ));
        }
        if let Some(segment) = blocked_component(&canonical) {
            return Err(format!(
                "Access denied: path '{}' contains blocked segment '{segment}'",
                canonical.display()
            ));
        }
        Ok(canonical)
    }

    /// Whether a directory found while walking should be skipped.
    pub fn is_blocked_name(name: &str) -> bool {
        BLOCKED_COMPONENTS.contains(&name)
    }
}

fn blocked_component(path: &Path) -> Option<&'static str> {
    if let Some(blocked) = BLOCKED_PATHS.iter().find(|b| path == Path::new(b)) {
        return Some(*blocked);
    }
    path.components().find_map(|c| match c {
        Component::Normal(name) => BLOCKED_COMPONENTS
            .iter()
            .find(|b| name.to_str() == Some(**b))
            .copied(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn sandbox() -> (FileSandbox, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (FileSandbox::new(dir.path()).unwrap(), dir)
    }

    #[test]
    fn relative_and_absolute_paths_inside_root() {
        let (sandbox, dir) = sandbox();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let relative = sandbox.resolve("notes.txt").unwrap();
        let absolute = sandbox
            .resolve(dir.path().join("notes.txt").to_str().unwrap())
            .unwrap();
        assert_eq!(relative, absolute);
        assert!(relative.starts_with(sandbox.root()));
    }

    #[test]
    fn traversal_outside_root_is_denied() {
        let (sandbox, dir) = sandbox();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let err = sandbox.resolve("sub/../..").unwrap_err();
        assert!(err.contains("outside sandbox"), "{err}");
    }

    #[test]
    fn blocked_segments_are_denied() {
        let (sandbox, dir) = sandbox();
        fs::create_dir(dir.path().join(".aws")).unwrap();
        fs::write(dir.path().join(".aws").join("credentials"), "[default]").unwrap();
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();

        let err = sandbox.resolve(".aws/credentials").unwrap_err();
        assert!(err.contains("blocked segment '.aws'"), "{err}");
        assert!(sandbox.resolve(".env").is_err());
    }

    #[test]
    fn similar_names_are_allowed() {
        let (sandbox, dir) = sandbox();
        fs::write(dir.path().join(".envrc"), "use flake").unwrap();
        assert!(sandbox.resolve(".envrc").is_ok());
    }

    #[test]
    fn missing_file_is_an_error() {
        let (sandbox, _dir) = sandbox();
        let err = sandbox.resolve("nope.txt").unwrap_err();
        assert!(err.starts_with("cannot resolve path 'nope.txt'"), "{err}");
    }
}
