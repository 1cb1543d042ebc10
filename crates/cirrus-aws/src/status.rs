//! Text rendition of the session indicator.

use tracing::info;

use crate::session::{AwsSession, SessionStore};

const UNSET: &str = "aws default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub text: String,
    pub tooltip: String,
}

impl StatusSummary {
    pub fn build(session: &AwsSession, has_credentials: bool) -> Self {
        let (text, headline) = if has_credentials {
            ("Aws ✓", "You have Aws Credentials")
        } else {
            ("Aws No Credentials", "No Aws Credentials Found !!!")
        };

        let or_unset = |value: &str| {
            if value.is_empty() {
                UNSET.to_string()
            } else {
                value.to_string()
            }
        };
        let tooltip = format!(
            "{headline}\nProfile: {}\nRegion: {}\nEndPoint: {}",
            or_unset(&session.profile),
            or_unset(&session.region),
            session.endpoint.as_deref().map(or_unset).unwrap_or_else(|| UNSET.to_string()),
        );

        Self {
            text: text.to_string(),
            tooltip,
        }
    }
}

/// Switch to the first available profile when the active one is not among
/// `profiles`. Returns the profile switched to.
pub fn reconcile_profile(store: &SessionStore, profiles: &[String]) -> Option<String> {
    let first = profiles.first()?;
    let active = store.get().profile;
    if profiles.iter().any(|p| *p == active) {
        return None;
    }
    info!(from = %active, to = %first, "active profile not found, switching");
    store.set_profile(first);
    Some(first.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cirrus_config::MemoryStore;

    use super::*;
    use crate::session::SessionDefaults;

    fn session(endpoint: Option<&str>) -> AwsSession {
        AwsSession {
            profile: "dev".into(),
            region: "eu-west-1".into(),
            endpoint: endpoint.map(String::from),
        }
    }

    #[test]
    fn with_credentials() {
        let status = StatusSummary::build(&session(Some("http://localhost:4566")), true);
        assert_eq!(status.text, "Aws ✓");
        assert_eq!(
            status.tooltip,
            "You have Aws Credentials\nProfile: dev\nRegion: eu-west-1\nEndPoint: http://localhost:4566"
        );
    }

    #[test]
    fn without_credentials_and_endpoint() {
        let status = StatusSummary::build(&session(None), false);
        assert_eq!(status.text, "Aws No Credentials");
        assert!(status.tooltip.starts_with("No Aws Credentials Found !!!"));
        assert!(status.tooltip.ends_with("EndPoint: aws default"));
    }

    fn store(profile: &str) -> SessionStore {
        let store = SessionStore::load(Arc::new(MemoryStore::new()), SessionDefaults::default());
        store.set_profile(profile);
        store
    }

    #[test]
    fn reconcile_switches_missing_profile() {
        let store = store("gone");
        let profiles = vec!["work".to_string(), "personal".to_string()];
        assert_eq!(reconcile_profile(&store, &profiles).as_deref(), Some("work"));
        assert_eq!(store.get().profile, "work");
    }

    #[test]
    fn reconcile_keeps_listed_profile() {
        let store = store("personal");
        let profiles = vec!["work".to_string(), "personal".to_string()];
        assert!(reconcile_profile(&store, &profiles).is_none());
        assert_eq!(store.get().profile, "personal");
    }

    #[test]
    fn reconcile_ignores_empty_list() {
        let store = store("dev");
        assert!(reconcile_profile(&store, &[]).is_none());
        assert_eq!(store.get().profile, "dev");
    }
}
