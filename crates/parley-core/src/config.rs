use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ParleyError, Result};

/// Top-level configuration for the parley relay.
///
/// Loaded from `~/.parley/config.toml` by default. Each section corresponds
/// to one adapter or cross-cutting concern. Credentials are never read from
/// this file; they come from the environment at process start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParleyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ParleyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Base URL of the Bot API.
    pub api_base: String,
    /// Long-poll timeout for getUpdates, in seconds.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 50,
        }
    }
}

/// Chat-completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Completion model identifier.
    pub model: String,
    /// Fixed instruction prepended to every completion request.
    pub system_prompt: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Transcription model identifier.
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Redis connection URL. Overridden by the REDIS_URL environment
    /// variable when set.
    pub redis_url: String,
    /// Maximum number of records retained per session after any write.
    pub max_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379/0".to_string(),
            max_turns: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ParleyConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert_eq!(config.telegram.poll_timeout_secs, 50);
        assert_eq!(config.completion.model, "gpt-3.5-turbo");
        assert_eq!(
            config.completion.system_prompt,
            "You are a helpful assistant."
        );
        assert_eq!(config.transcription.model, "whisper-1");
        assert_eq!(config.session.redis_url, "redis://localhost:6379/0");
        assert_eq!(config.session.max_turns, 10);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_default() {
        let config = ParleyConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.session.max_turns, 10);
    }

    #[test]
    fn test_load_invalid_toml_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [ valid toml").unwrap();
        let config = ParleyConfig::load_or_default(&path);
        assert_eq!(config.completion.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [ valid toml").unwrap();
        assert!(ParleyConfig::load(&path).is_err());
    }

    #[test]
    fn test_partial_config_uses_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[completion]\nmodel = \"gpt-4o-mini\"\n\n[session]\nmax_turns = 4\n",
        )
        .unwrap();

        let config = ParleyConfig::load(&path).unwrap();
        assert_eq!(config.completion.model, "gpt-4o-mini");
        // Unset field within a present section keeps its default.
        assert_eq!(
            config.completion.system_prompt,
            "You are a helpful assistant."
        );
        assert_eq!(config.session.max_turns, 4);
        // Absent sections are fully defaulted.
        assert_eq!(config.telegram.poll_timeout_secs, 50);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ParleyConfig::default();
        config.session.max_turns = 6;
        config.completion.system_prompt = "Answer briefly.".to_string();
        config.save(&path).unwrap();

        let back = ParleyConfig::load(&path).unwrap();
        assert_eq!(back.session.max_turns, 6);
        assert_eq!(back.completion.system_prompt, "Answer briefly.");
    }
}
