//! The active AWS session: profile, region and optional custom endpoint.
//!
//! Persisted in a [`KeyValueStore`] under `awsProfile`, `awsRegion` and
//! `awsEndpoint`. Every mutation is saved immediately; last write wins.

use std::sync::{Arc, RwLock};

use cirrus_common::ConfigError;
use cirrus_config::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const KEY_PROFILE: &str = "awsProfile";
pub const KEY_REGION: &str = "awsRegion";
pub const KEY_ENDPOINT: &str = "awsEndpoint";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwsSession {
    pub profile: String,
    pub region: String,
    /// Custom endpoint (LocalStack, MinIO, ...). `None` means the AWS default.
    pub endpoint: Option<String>,
}

impl AwsSession {
    /// The context block prepended to each chat turn.
    pub fn context_message(&self) -> String {
        format!(
            "Context:\nAWS Profile: {}\nAWS Region: {}\nAWS Endpoint: {}",
            self.profile,
            self.region,
            self.endpoint.as_deref().unwrap_or("default")
        )
    }
}

/// Fallbacks for absent or empty fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    pub profile: String,
    pub region: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            profile: "default".into(),
            region: "us-east-1".into(),
        }
    }
}

/// A partial update. `None` leaves a field alone; `Some("")` resets it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionUpdate {
    #[serde(default, alias = "AwsProfile")]
    pub profile: Option<String>,
    #[serde(default, alias = "AwsRegion")]
    pub region: Option<String>,
    #[serde(default, alias = "AwsEndPoint", alias = "AwsEndpoint")]
    pub endpoint: Option<String>,
}

impl SessionUpdate {
    pub fn profile(profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
            ..Self::default()
        }
    }

    pub fn region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }

    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }
}

pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    defaults: SessionDefaults,
    current: RwLock<AwsSession>,
}

impl SessionStore {
    /// Create the store and load the persisted session.
    pub fn load(store: Arc<dyn KeyValueStore>, defaults: SessionDefaults) -> Self {
        let current = read_session(store.as_ref(), &defaults);
        info!(
            profile = %current.profile,
            region = %current.region,
            endpoint = current.endpoint.as_deref().unwrap_or("default"),
            "session loaded"
        );
        Self {
            store,
            defaults,
            current: RwLock::new(current),
        }
    }

    pub fn get(&self) -> AwsSession {
        self.current
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Merge `update` into the session, save it, and return the new value.
    ///
    /// Save failures are logged; the in-memory session is updated regardless.
    pub fn set(&self, update: SessionUpdate) -> AwsSession {
        let updated = {
            let mut current = self.current.write().unwrap_or_else(|p| p.into_inner());
            if let Some(profile) = update.profile {
                current.profile = non_empty(&profile)
                    .unwrap_or(self.defaults.profile.as_str())
                    .to_string();
            }
            if let Some(region) = update.region {
                current.region = non_empty(&region)
                    .unwrap_or(self.defaults.region.as_str())
                    .to_string();
            }
            if let Some(endpoint) = update.endpoint {
                current.endpoint = non_empty(&endpoint).map(String::from);
            }
            current.clone()
        };

        debug!(?updated, "session updated");
        if let Err(e) = self.save() {
            warn!("failed to save session: {e}");
        }
        updated
    }

    pub fn set_profile(&self, profile: &str) -> AwsSession {
        self.set(SessionUpdate::profile(profile))
    }

    pub fn set_region(&self, region: &str) -> AwsSession {
        self.set(SessionUpdate::region(region))
    }

    pub fn set_endpoint(&self, endpoint: &str) -> AwsSession {
        self.set(SessionUpdate::endpoint(endpoint))
    }

    /// Write the current session to the backing store.
    pub fn save(&self) -> Result<(), ConfigError> {
        let session = self.get();
        self.store.update_many(&[
            (KEY_PROFILE, Some(session.profile.as_str())),
            (KEY_REGION, Some(session.region.as_str())),
            (KEY_ENDPOINT, session.endpoint.as_deref()),
        ])
    }

    /// Re-read the session from the backing store.
    pub fn reload(&self) -> AwsSession {
        let loaded = read_session(self.store.as_ref(), &self.defaults);
        *self.current.write().unwrap_or_else(|p| p.into_inner()) = loaded.clone();
        loaded
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn read_session(store: &dyn KeyValueStore, defaults: &SessionDefaults) -> AwsSession {
    let get = |key: &str| store.get(key).and_then(|v| non_empty(&v).map(String::from));
    AwsSession {
        profile: get(KEY_PROFILE).unwrap_or_else(|| defaults.profile.clone()),
        region: get(KEY_REGION).unwrap_or_else(|| defaults.region.clone()),
        endpoint: get(KEY_ENDPOINT),
    }
}
