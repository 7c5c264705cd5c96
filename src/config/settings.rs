//! Configuration settings for Tubescribe.

use crate::error::{Result, TubescribeError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
///
/// Built once at startup and handed to every component; nothing reads
/// configuration from globals after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub captions: CaptionSettings,
    pub ollama: OllamaSettings,
    pub whisper: WhisperSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files (caption downloads).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/tubescribe".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Caption fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionSettings {
    /// Preferred caption language for the first attempt.
    pub default_language: String,
    /// Path or name of the yt-dlp binary.
    pub ytdlp_path: String,
    /// Time budget for a single fetch attempt, in seconds.
    pub timeout_secs: u64,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Local inference backend (Ollama) settings.
///
/// The decoding parameters are operator-fixed; requests cannot override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model used for generation.
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    /// Context window length (`num_ctx`).
    pub num_ctx: u32,
    /// Time budget for the health probe, in seconds.
    pub probe_timeout_secs: u64,
    /// Time budget for a generation call, in seconds.
    pub request_timeout_secs: u64,
    /// Tags whose blocks are stripped from replies (e.g. `think` for `<think>…</think>`).
    pub reasoning_tags: Vec<String>,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:7b".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            num_ctx: 4096,
            probe_timeout_secs: 5,
            request_timeout_secs: 300,
            reasoning_tags: vec![
                "think".to_string(),
                "thinking".to_string(),
                "reasoning".to_string(),
            ],
        }
    }
}

/// External audio-transcription (Whisper) service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperSettings {
    /// Base URL of the transcription service.
    pub base_url: String,
    /// Path of the transcription endpoint.
    pub transcribe_path: String,
    /// Path probed before each transcription request.
    pub health_path: String,
    /// Probe the service before forwarding a request.
    pub probe_before_request: bool,
    pub probe_timeout_secs: u64,
    /// Audio download plus transcription can take a long time.
    pub timeout_secs: u64,
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            transcribe_path: "/transcribe".to_string(),
            health_path: "/docs".to_string(),
            probe_before_request: true,
            probe_timeout_secs: 5,
            timeout_secs: 900,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TubescribeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that would otherwise only fail on first use.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("ollama.base_url", &self.ollama.base_url),
            ("whisper.base_url", &self.whisper.base_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| TubescribeError::Config(format!("{} '{}': {}", name, value, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(TubescribeError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, value
                )));
            }
        }

        for (name, secs) in [
            ("captions.timeout_secs", self.captions.timeout_secs),
            ("ollama.probe_timeout_secs", self.ollama.probe_timeout_secs),
            ("ollama.request_timeout_secs", self.ollama.request_timeout_secs),
            ("whisper.probe_timeout_secs", self.whisper.probe_timeout_secs),
            ("whisper.timeout_secs", self.whisper.timeout_secs),
        ] {
            if secs == 0 {
                return Err(TubescribeError::Config(format!("{} must be greater than 0", name)));
            }
        }

        if self.ollama.model.trim().is_empty() {
            return Err(TubescribeError::Config("ollama.model is empty".to_string()));
        }

        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubescribe")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    pub fn caption_timeout(&self) -> Duration {
        Duration::from_secs(self.captions.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.captions.default_language, "en");
        assert!(settings.ollama.reasoning_tags.contains(&"think".to_string()));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [ollama]
            model = "llama3.2"
            "#,
        )
        .unwrap();

        assert_eq!(settings.ollama.model, "llama3.2");
        assert_eq!(settings.ollama.base_url, "http://localhost:11434");
        assert_eq!(settings.whisper.transcribe_path, "/transcribe");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 8080;
        settings.ollama.top_k = 20;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.ollama.top_k, 20);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut settings = Settings::default();
        settings.ollama.base_url = "localhost:11434".to_string();
        assert!(matches!(settings.validate(), Err(TubescribeError::Config(_))));

        let mut settings = Settings::default();
        settings.whisper.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.ollama.request_timeout_secs = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("ollama.request_timeout_secs"));
    }
}
