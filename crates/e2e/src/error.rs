//! Error types for the API suite

use std::path::PathBuf;
use thiserror::Error;

use crate::http::HttpMethod;

/// Boxed cause carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("{method} request failed for {endpoint}: {source}")]
    Transport {
        method: HttpMethod,
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} {endpoint} returned unexpected status {status}: {body}")]
    UnexpectedStatus {
        method: HttpMethod,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error("Schema validation failed: {}", .violations.join("; "))]
    Validation { violations: Vec<String> },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Screenshot capture failed: {0}")]
    Screenshot(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failures while loading fixture documents.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Test data file not found for environment: {environment} at path: {path}")]
    NotFound { environment: String, path: PathBuf },

    #[error("Malformed test data in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to read test data {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl E2eError {
    /// Short failure category shown as the exception type in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            E2eError::Transport { .. } => "Transport",
            E2eError::Decode { .. } => "Decode",
            E2eError::UnexpectedStatus { .. } => "UnexpectedStatus",
            E2eError::DataLoad(_) => "DataLoad",
            E2eError::Validation { .. } => "Validation",
            E2eError::Assertion(_) => "Assertion",
            E2eError::SchemaNotFound(_) => "SchemaNotFound",
            E2eError::Screenshot(_) => "Screenshot",
            E2eError::Config(_) => "Config",
            E2eError::Io(_) => "Io",
            E2eError::Json(_) => "Json",
            E2eError::Toml(_) => "Toml",
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
