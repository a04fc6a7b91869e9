//! Configuration for viva paths and the generation gateway.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VIVA_HOME, VIVA_GATEWAY_URL, VIVA_MODEL,
//!    VIVA_TIMEOUT_SECS)
//! 2. Config file (.viva/config.yaml)
//! 3. Defaults (~/.viva, OpenAI-compatible endpoint)
//!
//! Config file discovery searches the current directory and parents for
//! .viva/config.yaml. The API key is never read from the file; the gateway
//! takes it from the environment.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::SessionConfig;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub gateway: Option<GatewayFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayFileConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolved gateway settings
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Model used for both question and report generation
    pub model: String,
    /// Bounded per-request timeout
    pub timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to viva home (engine state)
    pub home: PathBuf,
    /// Gateway settings
    pub gateway: GatewaySettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Directory completed sessions are exported to
    pub fn sessions_dir(&self) -> PathBuf {
        self.home.join("sessions")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".viva").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".viva");

    let config_file = find_config_file();
    let file = match &config_file {
        Some(path) => Some(load_config_file(path)?),
        None => None,
    };

    let home = if let Ok(env_home) = std::env::var("VIVA_HOME") {
        PathBuf::from(env_home)
    } else if let Some(home) = file.as_ref().and_then(|f| f.home.clone()) {
        // Relative home is resolved against the .viva/ directory
        match config_file.as_ref().and_then(|p| p.parent()) {
            Some(base) if PathBuf::from(&home).is_relative() => base.join(home),
            _ => PathBuf::from(home),
        }
    } else {
        default_home
    };

    let file_gateway = file.and_then(|f| f.gateway).unwrap_or_default();
    let defaults = GatewaySettings::default();

    let gateway = GatewaySettings {
        base_url: std::env::var("VIVA_GATEWAY_URL")
            .ok()
            .or(file_gateway.base_url)
            .unwrap_or(defaults.base_url),
        model: std::env::var("VIVA_MODEL")
            .ok()
            .or(file_gateway.model)
            .unwrap_or(defaults.model),
        timeout_secs: std::env::var("VIVA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(file_gateway.timeout_secs)
            .unwrap_or(defaults.timeout_secs),
    };

    Ok(ResolvedConfig {
        home,
        gateway,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Load a session configuration from a YAML file
pub fn load_session_config(path: &Path) -> Result<SessionConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session config: {}", path.display()))?;

    let config: SessionConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse session config: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid session config: {}", path.display()))?;

    Ok(config)
}
