//! # CineMind Common Library
//!
//! Shared code for the CineMind review agent:
//! - Error type used across crates
//! - Configuration loading (TOML file, environment, compiled defaults)
//! - Text cleanup and summary helpers

pub mod config;
pub mod error;
pub mod text;

pub use config::TomlConfig;
pub use error::{Error, Result};
