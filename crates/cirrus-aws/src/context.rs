//! The shared state every AWS tool is built from.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::cache::{ClientCache, ServiceClient};
use crate::credentials::ProviderChain;
use crate::error::AwsError;
use crate::operations::OperationSpec;
use crate::protocol::ApiOutput;
use crate::service::Service;
use crate::session::{AwsSession, SessionStore};
use crate::transport::Transport;

/// Session plus client cache. Cheap to share behind an `Arc`.
pub struct AwsContext {
    session: SessionStore,
    cache: ClientCache,
}

impl AwsContext {
    pub fn new(session: SessionStore, providers: ProviderChain, transport: Arc<dyn Transport>) -> Self {
        Self {
            session,
            cache: ClientCache::new(providers, transport),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    pub async fn client(&self, service: Service) -> Result<Arc<ServiceClient>, AwsError> {
        self.cache.client(service, &self.session.get()).await
    }

    /// Run one operation through the cached client of `service`.
    pub async fn call(
        &self,
        service: Service,
        spec: &OperationSpec,
        params: &Map<String, Value>,
    ) -> Result<ApiOutput, AwsError> {
        self.client(service).await?.call(spec, params).await
    }

    /// Run one operation against `region` with a throwaway client. Credentials
    /// still come from the cache slot.
    pub async fn call_in_region(
        &self,
        service: Service,
        region: &str,
        spec: &OperationSpec,
        params: &Map<String, Value>,
    ) -> Result<ApiOutput, AwsError> {
        let session = self.session.get();
        let credentials = self.cache.credentials(service, &session).await?;
        let client = ServiceClient::new(
            service,
            region,
            session.endpoint.as_deref(),
            credentials,
            self.cache.transport(),
        );
        client.call(spec, params).await
    }

    /// Whether the active profile resolves to credentials, without caching.
    pub fn has_credentials(&self, session: &AwsSession) -> bool {
        self.cache.providers().resolve(&session.profile).is_ok()
    }

    /// Forget cached credentials and clients so the next call picks up the
    /// current session and credential files.
    pub async fn refresh(&self) {
        self.cache.invalidate().await;
    }
}
