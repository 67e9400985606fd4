//! Error types for client construction.
//!
//! Runtime failures of submissions and polls are reported as
//! [`hybiscus_core::OperationError`]; this module only covers configuration
//! problems detected before any request is sent.

use thiserror::Error;

/// Errors raised while validating a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// API key is empty or whitespace.
    #[error("API key is required")]
    MissingApiKey,

    /// Base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Timeout must be greater than zero.
    #[error("timeout must be greater than zero")]
    InvalidTimeout,

    /// Poll interval must be greater than zero.
    #[error("poll interval must be greater than zero")]
    InvalidPollInterval,
}
