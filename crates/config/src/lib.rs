//! Configuration management for the subtitle transcription pipeline.
//!
//! Supports loading configuration from:
//! - An optional TOML file
//! - Environment variables (`SUBTITLES__` prefix, `__` separator)
//! - Programmatic overrides via `Settings::default()` + field assignment
//!
//! Every sub-config has a `validate()` that rejects out-of-range values at
//! load time rather than surfacing confusing behavior deep in the pipeline.

pub mod settings;

pub use settings::{
    ObservabilityConfig, PipelineConfig, RuntimeEnvironment, Settings, TranslationConfig,
    load_settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
