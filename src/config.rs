//! Built-in configuration
//!
//! Defaults ship inside the binary as `config.toml` and are parsed once on
//! first access.

use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const CONFIG_TOML: &str = include_str!("../config.toml");

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub transcription: TranscriptionConfig,
    pub generation: GenerationConfig,
    pub wizard: WizardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of the transcription backend
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Interval between simulated progress updates
    pub progress_tick_ms: u64,
    pub progress_step: u8,
    /// Progress never passes this value until the transcript arrives
    pub progress_ceiling: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub timeout_secs: u64,
    pub openai_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    pub total_steps: usize,
    pub initial_step: usize,
}

impl TranscriptionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Parse a configuration document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.wizard.total_steps == 0 {
            return Err(ConfigError::Invalid("wizard.total_steps must be at least 1".into()));
        }
        if !(1..=self.wizard.total_steps).contains(&self.wizard.initial_step) {
            return Err(ConfigError::Invalid(format!(
                "wizard.initial_step {} is outside 1..={}",
                self.wizard.initial_step, self.wizard.total_steps
            )));
        }
        if self.transcription.progress_ceiling > 100 {
            return Err(ConfigError::Invalid(
                "transcription.progress_ceiling must be at most 100".into(),
            ));
        }
        Ok(())
    }
}

/// Load the embedded configuration, parsing it on first use
pub fn load_config() -> Result<&'static Config, ConfigError> {
    CONFIG.get_or_try_init(|| {
        let config = Config::from_toml_str(CONFIG_TOML)?;
        info!(
            endpoint = %config.transcription.endpoint,
            model = %config.generation.openai_model,
            "Loaded built-in configuration"
        );
        Ok(config)
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = load_config().expect("embedded config must parse");
        assert_eq!(config.wizard.total_steps, 3);
        assert_eq!(config.wizard.initial_step, 1);
        assert!(config.transcription.progress_ceiling <= 100);
    }

    #[test]
    fn test_rejects_initial_step_out_of_range() {
        let doc = CONFIG_TOML.replace("initial_step = 1", "initial_step = 4");
        let err = Config::from_toml_str(&doc).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Config::from_toml_str("[wizard\ntotal_steps = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
