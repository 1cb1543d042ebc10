pub mod errors;
pub mod id;

pub use errors::{CirrusError, ConfigError};
pub use id::{new_correlation_id, new_id};
