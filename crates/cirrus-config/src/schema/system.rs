//! System configuration types: local file access and logging.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Local file access for the file operations tool.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory the file tool is confined to. Defaults to the working directory.
    pub sandbox_root: Option<PathBuf>,
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Render as a `tracing_subscriber` filter directive for the cirrus crates.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "cirrus=trace",
            LogLevel::Debug => "cirrus=debug",
            LogLevel::Info => "cirrus=info",
            LogLevel::Warn => "cirrus=warn",
            LogLevel::Error => "cirrus=error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
