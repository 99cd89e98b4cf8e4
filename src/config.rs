//! Configuration management
//!
//! Manages the orchestrator configuration: wake phrase, recording window,
//! screening budgets, blocklist, and backend connection settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Voice turn settings
    #[serde(default)]
    pub voice: VoiceConfig,
    /// Call screening settings
    #[serde(default)]
    pub screening: ScreeningConfig,
    /// SMS triage settings
    #[serde(default)]
    pub sms: SmsConfig,
    /// Conversation backend connection
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Voice turn machine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Trigger utterance that opens a recording window (case-insensitive)
    #[serde(default = "default_wake_phrase")]
    pub wake_phrase: String,
    /// Hard timeout for one recording window, in seconds
    #[serde(default = "default_recording_window_secs")]
    pub recording_window_secs: u64,
    /// Spoken when the backend is unreachable
    #[serde(default = "default_fallback_connectivity")]
    pub fallback_connectivity: String,
    /// Spoken on any other backend failure
    #[serde(default = "default_fallback_generic")]
    pub fallback_generic: String,
}

fn default_wake_phrase() -> String {
    "hey jarvis".to_string()
}

fn default_recording_window_secs() -> u64 {
    5
}

fn default_fallback_connectivity() -> String {
    "Sorry, I can't reach the network right now.".to_string()
}

fn default_fallback_generic() -> String {
    "Sorry, something went wrong. Please try again.".to_string()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            wake_phrase: default_wake_phrase(),
            recording_window_secs: default_recording_window_secs(),
            fallback_connectivity: default_fallback_connectivity(),
            fallback_generic: default_fallback_generic(),
        }
    }
}

/// Call screening settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Overall wait budget for one screening decision, in milliseconds
    #[serde(default = "default_screening_timeout_ms")]
    pub timeout_ms: u64,
    /// Terms that block a caller outright (case-insensitive substring match)
    #[serde(default = "default_blocked_terms")]
    pub blocked_terms: Vec<String>,
}

fn default_screening_timeout_ms() -> u64 {
    1500
}

fn default_blocked_terms() -> Vec<String> {
    vec!["telemarketer".to_string(), "robocall".to_string()]
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_screening_timeout_ms(),
            blocked_terms: default_blocked_terms(),
        }
    }
}

/// SMS triage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Wait budget for one triage decision, in milliseconds
    #[serde(default = "default_sms_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_sms_timeout_ms() -> u64 {
    2000
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self { timeout_ms: default_sms_timeout_ms() }
    }
}

/// Conversation backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the conversation backend service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Logical user identity sent with every request
    #[serde(default = "default_user_id")]
    pub user_id: i64,
    /// Per-request timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_user_id() -> i64 {
    1
}

fn default_request_timeout_secs() -> u64 {
    20
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: default_user_id(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            screening: ScreeningConfig::default(),
            sms: SmsConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "pocket-agent", "pocket-agent")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Voice:");
    println!("  wake phrase:       {:?}", config.voice.wake_phrase);
    println!("  recording window:  {}s", config.voice.recording_window_secs);
    println!("Screening:");
    println!("  timeout:           {}ms", config.screening.timeout_ms);
    println!("  blocked terms:     {}", config.screening.blocked_terms.join(", "));
    println!("SMS:");
    println!("  timeout:           {}ms", config.sms.timeout_ms);
    println!("Backend:");
    println!("  base URL:          {}", config.backend.base_url);
    println!("  user id:           {}", config.backend.user_id);
    println!("  request timeout:   {}s", config.backend.request_timeout_secs);

    Ok(())
}

/// Set the wake phrase
pub fn set_wake_phrase(phrase: &str) -> Result<()> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        anyhow::bail!("Wake phrase cannot be empty");
    }
    let mut config = Config::load()?;
    config.voice.wake_phrase = phrase.to_string();
    config.save()?;
    println!("Wake phrase set to {:?}", phrase);
    Ok(())
}

/// Set the backend base URL
pub fn set_backend_url(url: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.backend.base_url = url.trim_end_matches('/').to_string();
    config.save()?;
    println!("Backend URL set to {}", config.backend.base_url);
    Ok(())
}

/// Add a term to the call screening blocklist
pub fn add_blocked_term(term: &str) -> Result<()> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        anyhow::bail!("Blocked term cannot be empty");
    }
    let mut config = Config::load()?;
    if config.screening.blocked_terms.iter().any(|t| t.eq_ignore_ascii_case(&term)) {
        println!("Term {:?} is already blocked", term);
        return Ok(());
    }
    config.screening.blocked_terms.push(term.clone());
    config.save()?;
    println!("Added blocked term {:?}", term);
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}
