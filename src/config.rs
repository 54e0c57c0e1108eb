use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::dialogue::Surface;

/// Configuration for the video tutor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    pub backend: BackendConfig,

    /// Practice session settings
    pub practice: PracticeConfig,

    /// Chat surface settings
    pub dialogue: DialogueConfig,

    /// Playback tracking settings
    pub timeline: TimelineConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the endpoint paths are resolved against
    pub base_url: String,

    /// Request timeout in seconds (unset = wait indefinitely)
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// Number of questions requested per session
    pub question_limit: usize,

    /// Wrong answers on one question before hints are requested
    pub max_wrong_attempts: u32,

    /// Delay before moving on after a correct answer (milliseconds)
    pub auto_advance_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Language sent with knowledge-point chats and used for placeholders
    pub language: String,

    /// Character limit of the video chat input
    pub video_max_chars: usize,

    /// Character limit of the knowledge-point chat input
    pub knowledge_point_max_chars: usize,

    /// Character limit of the practice chat input
    pub practice_max_chars: usize,

    /// Suggestions shown before the server sends any
    pub default_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Scroll the active knowledge point into view on change
    pub auto_scroll: bool,

    /// Step used by keyboard seek (seconds)
    pub seek_step_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory exported files are written to
    pub download_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl PracticeConfig {
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }
}

impl DialogueConfig {
    /// Input limit for a chat surface
    pub fn max_chars(&self, surface: Surface) -> usize {
        match surface {
            Surface::Video => self.video_max_chars,
            Surface::KnowledgePoint => self.knowledge_point_max_chars,
            Surface::Practice => self.practice_max_chars,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("video-tutor.toml"),
            PathBuf::from("config/video-tutor.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(PathBuf::from(home).join(".config/video-tutor/config.toml"));
        }

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path.display());
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config.with_env_overrides())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("VIDEO_TUTOR_BACKEND_URL") {
            self.backend.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("VIDEO_TUTOR_TIMEOUT") {
            self.backend.request_timeout_seconds = timeout.parse().ok();
        }

        if let Ok(language) = std::env::var("VIDEO_TUTOR_LANGUAGE") {
            self.dialogue.language = language;
        }

        if let Ok(log_level) = std::env::var("VIDEO_TUTOR_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.backend.base_url)
            .map_err(|e| anyhow!("Invalid backend base_url '{}': {}", self.backend.base_url, e))?;

        if self.practice.question_limit == 0 {
            return Err(anyhow!("question_limit must be greater than 0"));
        }

        if self.practice.max_wrong_attempts == 0 {
            return Err(anyhow!("max_wrong_attempts must be greater than 0"));
        }

        for surface in [Surface::Video, Surface::KnowledgePoint, Surface::Practice] {
            if self.dialogue.max_chars(surface) == 0 {
                return Err(anyhow!("Character limit for {} chat must be greater than 0", surface));
            }
        }

        if !(self.timeline.seek_step_seconds > 0.0) {
            return Err(anyhow!("seek_step_seconds must be positive"));
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Tutor Configuration:\n\
            - Backend: {}\n\
            - Request Timeout: {}\n\
            - Language: {}\n\
            - Questions Per Session: {}\n\
            - Hint After Wrong Answers: {}\n\
            - Auto-advance Delay: {}ms\n\
            - Auto-scroll: {}",
            self.backend.base_url,
            self.backend
                .request_timeout_seconds
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "none".to_string()),
            self.dialogue.language,
            self.practice.question_limit,
            self.practice.max_wrong_attempts,
            self.practice.auto_advance_delay_ms,
            self.timeline.auto_scroll
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                request_timeout_seconds: None,
            },
            practice: PracticeConfig {
                question_limit: 5,
                max_wrong_attempts: 3,
                auto_advance_delay_ms: 2000,
            },
            dialogue: DialogueConfig {
                language: "English".to_string(),
                video_max_chars: 500,
                knowledge_point_max_chars: 1000,
                practice_max_chars: 500,
                default_suggestions: vec![
                    "What is the core concept of this knowledge point?".to_string(),
                    "How is this knowledge point used in real-world applications?".to_string(),
                    "Can you show me a specific example?".to_string(),
                    "What are the connections between this knowledge point and other knowledge points?".to_string(),
                ],
            },
            timeline: TimelineConfig {
                auto_scroll: true,
                seek_step_seconds: 10.0,
            },
            output: OutputConfig {
                download_dir: PathBuf::from("./downloads"),
                log_level: "info".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.base_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, seconds: Option<u64>) -> Self {
        self.config.backend.request_timeout_seconds = seconds;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.config.dialogue.language = language.into();
        self
    }

    pub fn with_question_limit(mut self, limit: usize) -> Self {
        self.config.practice.question_limit = limit;
        self
    }

    pub fn with_auto_advance_delay(mut self, delay: Duration) -> Self {
        self.config.practice.auto_advance_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.download_dir = dir;
        self
    }

    pub fn enable_auto_scroll(mut self, enable: bool) -> Self {
        self.config.timeline.auto_scroll = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.practice.question_limit, 5);
        assert_eq!(config.practice.max_wrong_attempts, 3);
        assert_eq!(config.practice.auto_advance_delay(), Duration::from_secs(2));
        assert_eq!(config.backend.request_timeout_seconds, None);
        assert_eq!(config.dialogue.max_chars(Surface::KnowledgePoint), 1000);
        assert_eq!(config.dialogue.max_chars(Surface::Video), 500);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_backend_url("http://tutor.local:8080")
            .with_question_limit(3)
            .with_auto_advance_delay(Duration::from_millis(500))
            .enable_auto_scroll(false)
            .build();

        assert_eq!(config.backend.base_url, "http://tutor.local:8080");
        assert_eq!(config.practice.question_limit, 3);
        assert_eq!(config.practice.auto_advance_delay_ms, 500);
        assert!(!config.timeline.auto_scroll);
    }

    #[test]
    fn test_auto_advance_delay_saturates() {
        let config = ConfigBuilder::new().with_auto_advance_delay(Duration::MAX).build();
        assert_eq!(config.practice.auto_advance_delay_ms, u64::MAX);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let bad_url = ConfigBuilder::new().with_backend_url("nowhere").build();
        assert!(bad_url.validate().is_err());

        let no_questions = ConfigBuilder::new().with_question_limit(0).build();
        assert!(no_questions.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("video-tutor.toml");

        let config = ConfigBuilder::new().with_question_limit(4).build();
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.practice.question_limit, 4);
        assert_eq!(loaded.dialogue.default_suggestions.len(), 4);
    }
}
