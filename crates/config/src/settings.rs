//! Settings tree for the subtitle transcription pipeline (§6 Configuration,
//! §1.1 ambient stack expansion).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment, gating how strictly `validate()` is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Pipeline-stage configuration (§6, C1-C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sample_rate: u32,
    pub frame_stride: usize,
    pub max_chunk_seconds: f64,
    pub silence_threshold: f32,
    pub min_silence_seconds: f64,
    pub batch_size: usize,
    pub pause_threshold: f64,
    pub strong_pause_seconds: f64,
    pub max_words_per_llm_sentence: usize,
    /// Open-question decision (SPEC_FULL.md §9): promoted from a literal
    /// constant to a configurable threshold.
    pub skip_llm_word_threshold: usize,
    pub segmentation_temperature: f32,
    pub segmentation_max_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_stride: 20,
            max_chunk_seconds: 30.0,
            silence_threshold: 0.01,
            min_silence_seconds: 0.3,
            batch_size: 100,
            pause_threshold: 0.8,
            strong_pause_seconds: 1.5,
            max_words_per_llm_sentence: 25,
            skip_llm_word_threshold: 4,
            segmentation_temperature: 0.3,
            segmentation_max_retries: 3,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.silence_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.silence_threshold".into(),
                message: "must be in (0.0, 1.0)".into(),
            });
        }
        if self.max_chunk_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_chunk_seconds".into(),
                message: "must be positive".into(),
            });
        }
        if self.min_silence_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.min_silence_seconds".into(),
                message: "must be positive".into(),
            });
        }
        if self.pause_threshold <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.pause_threshold".into(),
                message: "must be positive".into(),
            });
        }
        if self.strong_pause_seconds <= self.pause_threshold {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.strong_pause_seconds".into(),
                message: "must exceed pause_threshold".into(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.batch_size".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.sample_rate".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Translation-engine configuration (§6, C8).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub source_language: String,
    pub target_language: String,
    pub context_before: usize,
    pub context_after: usize,
    pub batch_size: usize,
    pub thread_count: usize,
    pub rpm: u32,
    pub enable_reflection: bool,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: "en".into(),
            target_language: "es".into(),
            context_before: 5,
            context_after: 3,
            batch_size: 20,
            thread_count: 4,
            rpm: 0,
            enable_reflection: false,
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
        }
    }
}

impl TranslationConfig {
    pub fn validate(&self, env: RuntimeEnvironment) -> Result<(), ConfigError> {
        if self.thread_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "translation.thread_count".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "translation.batch_size".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.source_language.is_empty() || self.target_language.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "translation.language".into(),
                message: "source and target language must be set".into(),
            });
        }
        if env.is_strict() && self.api_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "translation.api_key".into(),
                message: "must be set outside development".into(),
            });
        }
        Ok(())
    }
}

/// Logging / tracing configuration (§1.1 ambient stack).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub json_logs: bool,
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;
        self.translation.validate(self.environment)?;
        Ok(())
    }
}

/// Load settings from an optional TOML file layered under
/// `SUBTITLES__`-prefixed environment variable overrides, e.g.
/// `SUBTITLES__TRANSLATION__API_KEY`.
pub fn load_settings(config_path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = config_path {
        builder = builder.add_source(File::with_name(path).required(false));
    }
    builder = builder.add_source(
        Environment::with_prefix("SUBTITLES")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
