//! Configuration schema types for Cirrus.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod assistant;
mod aws;
mod system;

pub use assistant::*;
pub use aws::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Cirrus.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CirrusConfig {
    pub assistant: AssistantConfig,
    pub aws: AwsConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
}
