use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub hotkey: HotkeyConfig,
    pub audio: AudioConfig,
    pub model: ModelConfig,
    pub drain: DrainConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HotkeyConfig {
    pub modifiers: Vec<String>,
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    /// Capture sample rate in Hz. The recognizer runs at this rate.
    pub sample_rate: u32,
    /// Frames per recognition feed.
    pub block_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Candidate model directories, probed in order; first existing wins.
    pub paths: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DrainConfig {
    /// Delay between stop and typing, letting the capture worker unwind.
    pub delay_ms: u64,
    /// Pause after focus restoration before keystrokes are sent.
    pub focus_settle_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub log_path: String,
}

impl Config {
    /// Load config from ~/.voicetype.toml, writing a default file on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default(&config_path).context("failed to create default config")?;
        }

        let contents = fs::read_to_string(&config_path).context("failed to read config file")?;

        let config: Self = toml::from_str(&contents).context("failed to parse config TOML")?;

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".voicetype.toml"))
    }

    fn create_default(path: &PathBuf) -> Result<()> {
        let default_config = r#"[hotkey]
modifiers = ["Control", "Alt"]
key = "R"

[audio]
sample_rate = 16000
block_size = 8000

[model]
paths = [
    "./models/vosk-model-small-en-us-0.15",
    "~/.local/share/vosk-model",
    "./vosk-model",
    "/usr/share/vosk-model",
]

[drain]
delay_ms = 500
focus_settle_ms = 200

[telemetry]
enabled = false
log_path = "~/.voicetype/voicetype.log"
"#;
        fs::write(path, default_config).context("failed to write default config")?;
        Ok(())
    }

    /// Expand ~ in paths to home directory
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            block_size: 8000,
        }
    }
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            focus_settle_ms: 200,
        }
    }
}
