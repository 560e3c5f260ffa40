use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::answer::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::error::VoiceError;
use crate::recognition::{RecognitionSource, DEFAULT_LANGUAGE};
use crate::session::SessionConfig;

/// Prefix of environment overrides, e.g. `VOICE_QA__ANSWER__ENDPOINT`
pub const ENV_PREFIX: &str = "VOICE_QA";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub recognition: RecognitionConfig,
    pub answer: AnswerConfig,
    pub session: SessionConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// BCP-47 locale for the recognizer
    pub language: String,
    /// Which recognition backend to use
    pub source: RecognitionSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            source: RecognitionSource::None,
        }
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

impl AnswerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load from an optional file (any format `config` understands, extension
    /// may be omitted) with environment overrides on top
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        let cfg: Self = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> std::result::Result<(), VoiceError> {
        if self.answer.endpoint.trim().is_empty() {
            return Err(VoiceError::Config("answer.endpoint must not be empty".into()));
        }
        if self.answer.timeout_secs == 0 {
            return Err(VoiceError::Config("answer.timeout_secs must be positive".into()));
        }
        if self.recognition.language.trim().is_empty() {
            return Err(VoiceError::Config("recognition.language must not be empty".into()));
        }
        Ok(())
    }
}
