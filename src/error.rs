// SPDX-License-Identifier: MIT

//! Typed error handling for weft-rs
//!
//! One error enum covers the whole crate. Every failure propagates
//! unmodified to the run's caller; there is no retry layer and no
//! partial-failure recovery anywhere in the baseline design.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, WeftError>;

/// Top-level error type for weft-rs
#[derive(Debug, Error)]
pub enum WeftError {
    /// Router returned a key with no matching branch (no default branch exists)
    #[error("no branch for routing key '{key}' after step '{step}'")]
    Routing { step: String, key: String },

    /// A tool invocation request named a tool absent from the registry
    #[error("tool '{name}' is not registered")]
    UnknownTool { name: String },

    /// Gateway output did not conform to the requested structured-output schema
    #[error("structured output violates schema: {0}")]
    SchemaViolation(String),

    /// A graph edge or fan-out spawn referenced a step that does not exist
    #[error("step '{name}' is not defined in the graph")]
    UnknownStep { name: String },

    /// Aggregate query over an empty filtered set
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// Caller-set step budget exceeded
    #[error("step limit reached: {limit}")]
    StepLimit { limit: usize },

    /// API errors from the model provider
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Configuration errors (missing env vars, invalid config)
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Generic error from a tool callable
    #[error("{0}")]
    Other(String),
}

impl WeftError {
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<&str> for WeftError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for WeftError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}
