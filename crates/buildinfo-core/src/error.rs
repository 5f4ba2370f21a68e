//! Error types for build-info extraction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("build {build_result_key} has no '{key}' entry in its custom build data")]
    MissingBuildTimestamp {
        build_result_key: String,
        key: String,
    },

    #[error("invalid build timestamp '{value}': {source}")]
    InvalidBuildTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for build-info extraction
pub type Result<T> = std::result::Result<T, ExtractError>;
