//! Errors raised while loading configuration and checking requests

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Config file exists but could not be read
    #[error("cannot read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Review request rejected before any lookup
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}
