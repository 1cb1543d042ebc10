//! Credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.

use super::{Credentials, CredentialsError, ProvideCredentials};

/// Snapshot of the AWS variables in the process environment.
///
/// Environment credentials belong to the profile named by `AWS_PROFILE`
/// (or `default` when unset); asking for any other profile falls through.
#[derive(Debug, Default, Clone)]
pub struct EnvProvider {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    profile: Option<String>,
}

impl EnvProvider {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            access_key_id: get("AWS_ACCESS_KEY_ID"),
            secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            session_token: get("AWS_SESSION_TOKEN"),
            profile: get("AWS_PROFILE"),
        }
    }
}

impl ProvideCredentials for EnvProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn provide(&self, profile: &str) -> Result<Option<Credentials>, CredentialsError> {
        if profile != self.profile.as_deref().unwrap_or("default") {
            return Ok(None);
        }
        let (Some(key), Some(secret)) = (&self.access_key_id, &self.secret_access_key) else {
            return Ok(None);
        };
        Ok(Some(Credentials {
            access_key_id: key.clone(),
            secret_access_key: secret.clone(),
            session_token: self.session_token.clone(),
        }))
    }
}
