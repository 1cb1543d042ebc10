//! AWS tools for the Cirrus assistant.
//!
//! Everything the model can do against AWS goes through here:
//! - [`session`]: active profile / region / endpoint, persisted on every change
//! - [`credentials`]: environment and shared-credentials-file providers
//! - [`cache`]: one credential + client slot per service, filled at most once
//! - [`protocol`] and [`sigv4`]: the signed HTTP wire formats AWS speaks
//! - [`operations`]: static per-command request descriptors
//! - [`tools`] and [`registry`]: the tool catalogue and its invoke contract

pub mod cache;
pub mod context;
pub mod credentials;
pub mod error;
pub mod operations;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod session;
pub mod sigv4;
pub mod status;
pub mod tools;
pub mod transport;

pub use cache::{ClientCache, ServiceClient};
pub use context::AwsContext;
pub use credentials::{Credentials, CredentialsError, ProviderChain};
pub use error::{AwsError, ErrorCode, ErrorInfo, ServiceError};
pub use protocol::ApiOutput;
pub use registry::ToolRegistry;
pub use service::Service;
pub use session::{AwsSession, SessionDefaults, SessionStore, SessionUpdate};
pub use status::StatusSummary;
pub use tools::{Tool, ToolResult};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
