//! Per-service credential and client cache.
//!
//! One slot per [`Service`]. A slot resolves credentials at most once and
//! builds its client at most once; both live until [`ClientCache::invalidate`].
//! Session changes do not clear slots, so a client keeps the region and
//! endpoint it was built with.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::credentials::{Credentials, ProviderChain};
use crate::error::AwsError;
use crate::operations::OperationSpec;
use crate::protocol::{self, ApiOutput};
use crate::service::Service;
use crate::session::AwsSession;
use crate::sigv4::{self, SigningParams};
use crate::transport::Transport;

/// A configured handle for one service: endpoint, signing identity, transport.
pub struct ServiceClient {
    service: Service,
    region: String,
    signing_region: String,
    endpoint: String,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl ServiceClient {
    pub fn new(
        service: Service,
        region: &str,
        custom_endpoint: Option<&str>,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            service,
            region: region.to_string(),
            signing_region: service.signing_region(region),
            endpoint: service.endpoint(region, custom_endpoint),
            credentials,
            transport,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Encode, sign and send one operation, then decode its response.
    pub async fn call(
        &self,
        spec: &OperationSpec,
        params: &Map<String, Value>,
    ) -> Result<ApiOutput, AwsError> {
        let mut request = protocol::encode_request(self.service, &self.endpoint, spec, params)?;
        sigv4::sign(
            &mut request,
            &SigningParams {
                credentials: &self.credentials,
                region: &self.signing_region,
                service: self.service.signing_name(),
                time: Utc::now(),
                double_encode_path: self.service.double_encode_path(),
                payload_hash_header: self.service == Service::S3,
            },
        )?;

        debug!(service = %self.service, operation = spec.name, "calling AWS");
        let response = self.transport.send(request).await?;
        protocol::decode_response(self.service, spec, &response)
    }
}

#[derive(Default)]
struct Slot {
    credentials: Option<Credentials>,
    client: Option<Arc<ServiceClient>>,
}

pub struct ClientCache {
    providers: ProviderChain,
    transport: Arc<dyn Transport>,
    slots: [Mutex<Slot>; Service::ALL.len()],
}

impl ClientCache {
    pub fn new(providers: ProviderChain, transport: Arc<dyn Transport>) -> Self {
        Self {
            providers,
            transport,
            slots: std::array::from_fn(|_| Mutex::new(Slot::default())),
        }
    }

    pub fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    fn slot(&self, service: Service) -> &Mutex<Slot> {
        &self.slots[service as usize]
    }

    /// Cached credentials for `service`, resolved for the session's profile
    /// on first use.
    pub async fn credentials(
        &self,
        service: Service,
        session: &AwsSession,
    ) -> Result<Credentials, AwsError> {
        let mut slot = self.slot(service).lock().await;
        self.fill_credentials(&mut slot, service, session)
    }

    /// Cached client for `service`, built from the session on first use.
    pub async fn client(
        &self,
        service: Service,
        session: &AwsSession,
    ) -> Result<Arc<ServiceClient>, AwsError> {
        let mut slot = self.slot(service).lock().await;
        if let Some(ref client) = slot.client {
            debug!(%service, "using cached client");
            return Ok(Arc::clone(client));
        }

        let credentials = self.fill_credentials(&mut slot, service, session)?;
        let client = Arc::new(ServiceClient::new(
            service,
            &session.region,
            session.endpoint.as_deref(),
            credentials,
            Arc::clone(&self.transport),
        ));
        info!(
            %service,
            region = %session.region,
            endpoint = client.endpoint(),
            "client created"
        );
        slot.client = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Drop every cached credential and client.
    pub async fn invalidate(&self) {
        for slot in &self.slots {
            *slot.lock().await = Slot::default();
        }
        info!("credential and client cache cleared");
    }

    fn fill_credentials(
        &self,
        slot: &mut Slot,
        service: Service,
        session: &AwsSession,
    ) -> Result<Credentials, AwsError> {
        if let Some(ref credentials) = slot.credentials {
            debug!(
                %service,
                access_key_id = %credentials.access_key_id,
                "using cached credentials"
            );
            return Ok(credentials.clone());
        }
        let credentials = self.providers.resolve(&session.profile)?;
        info!(
            %service,
            profile = %session.profile,
            access_key_id = %credentials.access_key_id,
            "credentials loaded"
        );
        slot.credentials = Some(credentials.clone());
        Ok(credentials)
    }
}
