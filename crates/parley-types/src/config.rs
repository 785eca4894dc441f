//! Application configuration types for Parley.
//!
//! `AppConfig` represents the top-level `parley.toml`: the debug flag, the
//! pretrained model directory, the transcript file, and the server and
//! generation tables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::generation::GenerationParams;

/// Top-level configuration.
///
/// All fields have defaults so a partial (or empty) file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Verbose logging and error details in 500 responses.
    #[serde(default)]
    pub debug: bool,

    /// Directory holding `config.json`, `tokenizer.json` and
    /// `model.safetensors` of a GPT-2 family model.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Append-only transcript file.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Whether the transcript seeds the running context after a restart.
    #[serde(default)]
    pub history_mode: HistoryMode,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationParams,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/DialoGPT-large")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/history.txt")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            model_path: default_model_path(),
            history_path: default_history_path(),
            history_mode: HistoryMode::default(),
            server: ServerConfig::default(),
            generation: GenerationParams::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// How the transcript file participates in generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// The transcript is read and encoded on every exchange but only the
    /// in-memory running context reaches the model.
    #[default]
    Ignore,
    /// When the running context is empty (fresh process), the encoded
    /// transcript is prepended to the model input.
    Seed,
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryMode::Ignore => write!(f, "ignore"),
            HistoryMode::Seed => write!(f, "seed"),
        }
    }
}

impl FromStr for HistoryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(HistoryMode::Ignore),
            "seed" => Ok(HistoryMode::Seed),
            other => Err(format!("invalid history mode: '{other}'")),
        }
    }
}
