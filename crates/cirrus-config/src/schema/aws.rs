//! AWS defaults used before any session state has been saved.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub default_profile: String,
    pub default_region: String,
    /// Per-request timeout for AWS API calls (valid range: 1-600).
    pub request_timeout_secs: u32,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            default_profile: "default".into(),
            default_region: "us-east-1".into(),
            request_timeout_secs: 60,
        }
    }
}
