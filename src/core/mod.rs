//! Core module - shared configuration and error handling

pub mod config;
pub mod error;

pub use config::{Config, EndpointConfig, RuntimeConfig};
pub use error::{Result, TroupeError};
