//! Configuration for the assistant
//!
//! Settings come from a TOML file, then environment variables override the
//! credentials and paths, then CLI flags override those.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Complete assistant configuration
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub recognizer: RecognizerConfig,
    pub speech: SpeechConfig,
    pub weather: WeatherConfig,
    pub mail: MailConfig,
    pub commands: CommandsConfig,
}

/// Speech recognition settings
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Listen with the microphone; when false every listen is typed
    pub enabled: bool,

    /// Path to the Whisper model file
    pub model_path: PathBuf,

    pub language: String,

    pub n_threads: i32,

    /// How long to wait for speech to begin
    pub listen_timeout_secs: u64,

    /// Trailing silence that ends a phrase
    pub silence_secs: f32,

    pub vad_threshold: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            language: "en".to_string(),
            n_threads: 4,
            listen_timeout_secs: 8,
            silence_secs: 0.8,
            vad_threshold: 0.5,
        }
    }
}

/// Spoken output settings
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub model_path: Option<String>,
    pub tokens_path: Option<String>,
    pub speaker_id: i32,
    /// Speech rate (1.0 = normal, <1.0 = faster, >1.0 = slower)
    pub length_scale: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model_path: None,
            tokens_path: None,
            speaker_id: 0,
            length_scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// City used when the user doesn't name one
    pub default_city: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: "Chennai".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Sender address, also the SMTP login
    pub address: Option<String>,
    /// SMTP password (an app password for Gmail)
    pub password: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            address: None,
            password: None,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            timeout_secs: 20,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// JSON file holding custom trigger → response pairs
    pub file: PathBuf,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("custom_commands.json"),
        }
    }
}

impl AssistantConfig {
    /// Default location: `<config dir>/sayso/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sayso").join("config.toml"))
    }

    /// Load from a TOML file; a missing file yields defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::IoError {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { error, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                error,
            },
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: "<inline>".to_string(),
            error: e.to_string(),
        })
    }

    /// Apply `SAYSO_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values count as unset
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get("SAYSO_MODEL_PATH") {
            self.recognizer.model_path = PathBuf::from(path);
        }
        if let Some(key) = get("SAYSO_WEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(city) = get("SAYSO_DEFAULT_CITY") {
            self.weather.default_city = city;
        }
        if let Some(address) = get("SAYSO_EMAIL_ADDRESS") {
            self.mail.address = Some(address);
        }
        if let Some(password) = get("SAYSO_EMAIL_PASSWORD") {
            self.mail.password = Some(password);
        }
        if let Some(file) = get("SAYSO_COMMANDS_FILE") {
            self.commands.file = PathBuf::from(file);
        }
    }

    /// Disable voice input (text-only mode)
    pub fn without_voice_input(mut self) -> Self {
        self.recognizer.enabled = false;
        self
    }

    /// Enable spoken output
    pub fn with_speech_output(mut self) -> Self {
        self.speech.enabled = true;
        self
    }

    /// Check that required model files exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recognizer.enabled && !self.recognizer.model_path.exists() {
            return Err(ConfigError::MissingModel(format!(
                "Speech recognition model not found at '{}'. Download a Whisper model or run with --text-only.",
                self.recognizer.model_path.display()
            )));
        }

        if self.speech.enabled {
            for (label, path) in [
                ("TTS model", &self.speech.model_path),
                ("TTS tokens file", &self.speech.tokens_path),
            ] {
                match path {
                    Some(path) if Path::new(path).exists() => {}
                    Some(path) => {
                        return Err(ConfigError::ValidationError(format!(
                            "{} not found: {}",
                            label, path
                        )))
                    }
                    None => {
                        return Err(ConfigError::ValidationError(format!(
                            "{} path is required when speech output is enabled",
                            label
                        )))
                    }
                }
            }
        }

        Ok(())
    }
}

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error reading the file
    IoError { path: String, error: String },
    /// Error parsing the TOML
    ParseError { path: String, error: String },
    /// The speech recognition model is missing
    MissingModel(String),
    /// Any other invalid setting
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, error } => {
                write!(f, "Failed to read config '{}': {}", path, error)
            }
            ConfigError::ParseError { path, error } => {
                write!(f, "Failed to parse config '{}': {}", path, error)
            }
            ConfigError::MissingModel(msg) => write!(f, "{}", msg),
            ConfigError::ValidationError(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
