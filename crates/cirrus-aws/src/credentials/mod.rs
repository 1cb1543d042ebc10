//! Credential resolution.
//!
//! A [`ProviderChain`] asks each provider in turn for the credentials of a
//! named profile and returns the first hit. The default chain is the process
//! environment followed by the shared credentials file.

mod env;
mod profile_file;

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

pub use env::EnvProvider;
pub use profile_file::{list_profiles, parse_ini, shared_credentials_path, ProfileFileProvider};

/// An AWS access key pair, optionally with a session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("AWS credentials not found")]
    NotFound,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile '{profile}' is missing {field}")]
    Incomplete {
        profile: String,
        field: &'static str,
    },
}

/// A single source of credentials.
pub trait ProvideCredentials: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// `Ok(None)` means "not here, try the next provider".
    fn provide(&self, profile: &str) -> Result<Option<Credentials>, CredentialsError>;
}

/// Fixed credentials, regardless of profile.
pub struct StaticProvider(pub Credentials);

impl ProvideCredentials for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    fn provide(&self, _profile: &str) -> Result<Option<Credentials>, CredentialsError> {
        Ok(Some(self.0.clone()))
    }
}

/// Ordered list of providers.
pub struct ProviderChain {
    providers: Vec<Box<dyn ProvideCredentials>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn ProvideCredentials>>) -> Self {
        Self { providers }
    }

    /// Environment variables, then the shared credentials file.
    pub fn default_chain() -> Self {
        Self::new(vec![
            Box::new(EnvProvider::from_env()),
            Box::new(ProfileFileProvider::from_env()),
        ])
    }

    /// Resolve credentials for `profile`. The first provider that answers
    /// wins; a provider error stops the walk.
    pub fn resolve(&self, profile: &str) -> Result<Credentials, CredentialsError> {
        for provider in &self.providers {
            if let Some(credentials) = provider.provide(profile)? {
                debug!(
                    provider = provider.name(),
                    profile,
                    access_key_id = %credentials.access_key_id,
                    "credentials resolved"
                );
                return Ok(credentials);
            }
        }
        Err(CredentialsError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl ProvideCredentials for Nothing {
        fn name(&self) -> &'static str {
            "nothing"
        }

        fn provide(&self, _profile: &str) -> Result<Option<Credentials>, CredentialsError> {
            Ok(None)
        }
    }

    #[test]
    fn empty_chain_is_not_found() {
        let err = ProviderChain::new(vec![Box::new(Nothing)])
            .resolve("default")
            .unwrap_err();
        assert!(matches!(err, CredentialsError::NotFound));
        assert_eq!(err.to_string(), "AWS credentials not found");
    }

    #[test]
    fn first_answering_provider_wins() {
        let chain = ProviderChain::new(vec![
            Box::new(Nothing),
            Box::new(StaticProvider(Credentials::new("AKIDFIRST", "s1"))),
            Box::new(StaticProvider(Credentials::new("AKIDSECOND", "s2"))),
        ]);
        assert_eq!(chain.resolve("dev").unwrap().access_key_id, "AKIDFIRST");
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::new("AKID", "very-secret").with_session_token("sess-9f2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("sess-9f2"));
    }
}
