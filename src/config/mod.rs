pub mod io;
pub mod types;

use thiserror::Error;

pub use io::{read_config, write_config};
pub use types::EngineConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
