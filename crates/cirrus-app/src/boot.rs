//! Startup: config, logging and the shared AWS context.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cirrus_aws::credentials::{list_profiles, shared_credentials_path};
use cirrus_aws::status::reconcile_profile;
use cirrus_aws::tools::FileSandbox;
use cirrus_aws::{AwsContext, HttpTransport, ProviderChain, SessionDefaults, SessionStore, ToolRegistry};
use cirrus_common::CirrusError;
use cirrus_config::schema::LogLevel;
use cirrus_config::{default_state_path, CirrusConfig, JsonFileStore, KeyValueStore, MemoryStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Load the config from `path` or the default location. Failures fall back
/// to defaults; the error is returned so it can be logged once logging is up.
pub fn load_config(path: Option<&Path>) -> (CirrusConfig, Option<String>) {
    let loaded = match path {
        Some(path) => cirrus_config::load_config_from(path),
        None => cirrus_config::load_config(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (CirrusConfig::default(), Some(e.to_string())),
    }
}

/// The filter directive: the `--log-level` flag wins over the config.
pub fn log_directive(flag: Option<&str>, config: &CirrusConfig) -> String {
    match flag {
        Some(level) if !level.contains('=') => format!("cirrus={level}"),
        Some(directive) => directive.to_string(),
        None => config.logging.level.directive().to_string(),
    }
}

/// `RUST_LOG`, when set, replaces `directive`.
pub fn init_logging(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::Info.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub struct App {
    pub config: CirrusConfig,
    pub context: Arc<AwsContext>,
    pub registry: Arc<ToolRegistry>,
}

impl App {
    /// Build against the persistent state file.
    pub fn build(config: CirrusConfig) -> Result<Self, CirrusError> {
        let store: Arc<dyn KeyValueStore> = match default_state_path() {
            Ok(path) => Arc::new(JsonFileStore::open(path)),
            Err(e) => {
                warn!("session will not be persisted: {e}");
                Arc::new(MemoryStore::new())
            }
        };
        Self::build_with_store(config, store)
    }

    pub fn build_with_store(
        config: CirrusConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CirrusError> {
        let session = SessionStore::load(
            store,
            SessionDefaults {
                profile: config.aws.default_profile.clone(),
                region: config.aws.default_region.clone(),
            },
        );
        let transport = HttpTransport::new(Duration::from_secs(u64::from(
            config.aws.request_timeout_secs,
        )))
        .map_err(|e| CirrusError::Aws(e.to_string()))?;
        let context = Arc::new(AwsContext::new(
            session,
            ProviderChain::default_chain(),
            Arc::new(transport),
        ));

        let profiles = available_profiles();
        if let Some(profile) = reconcile_profile(context.session(), &profiles) {
            info!(%profile, "switched to first available profile");
        }

        let root = match config.files.sandbox_root.clone() {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        let sandbox = FileSandbox::new(&root)?;
        info!(root = %sandbox.root().display(), "file sandbox ready");

        let registry = Arc::new(ToolRegistry::aws_defaults(context.clone(), sandbox));
        info!(tools = registry.len(), "tool registry ready");

        Ok(Self {
            config,
            context,
            registry,
        })
    }
}

/// Profiles in the shared credentials file. Empty when there is no file.
pub fn available_profiles() -> Vec<String> {
    let Some(path) = shared_credentials_path() else {
        return Vec::new();
    };
    list_profiles(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), "failed to list profiles: {e}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_flag_overrides_config() {
        let config = CirrusConfig::default();
        assert_eq!(log_directive(None, &config), "cirrus=info");
        assert_eq!(log_directive(Some("debug"), &config), "cirrus=debug");
        assert_eq!(
            log_directive(Some("cirrus_aws=trace"), &config),
            "cirrus_aws=trace"
        );
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, error) = load_config(Some(&dir.path().join("absent.toml")));
        assert!(error.is_some());
        assert_eq!(config.assistant.max_tool_rounds, 10);
    }

    #[test]
    fn build_wires_session_defaults_and_tools() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", dir.path().join("none"));

        let mut config = CirrusConfig::default();
        config.aws.default_region = "eu-north-1".into();
        config.files.sandbox_root = Some(dir.path().to_path_buf());

        let app = App::build_with_store(config, Arc::new(MemoryStore::new())).unwrap();
        let session = app.context.session().get();
        assert_eq!(session.region, "eu-north-1");
        assert_eq!(session.profile, "default");
        assert_eq!(app.registry.len(), 15);
        assert!(app.registry.get("file_operations").is_some());
    }
}
