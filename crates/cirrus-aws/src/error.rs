//! Error types for AWS calls and their tool-result rendering.

use serde::Serialize;

use crate::credentials::CredentialsError;

/// An error reported by an AWS service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Exception name, e.g. `NoSuchBucket` or `ResourceNotFoundException`.
    pub name: String,
    pub message: String,
    pub code: ErrorCode,
    pub request_id: Option<String>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Error code carried in a failure envelope: the service's own code when it
/// sends one, otherwise the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Status(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum AwsError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("{0}")]
    Service(ServiceError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

/// The `error` object of a failed tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code: None,
        }
    }
}

impl From<&AwsError> for ErrorInfo {
    fn from(err: &AwsError) -> Self {
        match err {
            AwsError::Service(e) => ErrorInfo {
                name: e.name.clone(),
                message: e.message.clone(),
                code: Some(e.code.clone()),
            },
            AwsError::Credentials(e) => ErrorInfo::new("CredentialsProviderError", e.to_string()),
            AwsError::InvalidParameter(m) => ErrorInfo::new("ValidationError", m.clone()),
            AwsError::Network(m) => ErrorInfo::new("NetworkError", m.clone()),
            AwsError::Parse(m) => ErrorInfo::new("ParseError", m.clone()),
            AwsError::Signing(m) => ErrorInfo::new("SigningError", m.clone()),
        }
    }
}
