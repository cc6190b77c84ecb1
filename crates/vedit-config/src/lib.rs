pub mod config;
pub mod discovery;
pub mod error;

// Re-export main types
pub use config::*;
pub use error::*;

pub use discovery::{CONFIG_FILE_NAME, ConfigDiscovery, ENV_PREFIX};
