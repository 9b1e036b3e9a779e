//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.evagent/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::wizard::FailurePolicy;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EvagentConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub chat_path: Option<String>,
    pub connection_string: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub greeting: Option<String>,
    pub typing_indicator_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WizardConfig {
    pub failure_policy: Option<FailurePolicy>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TYPING_INDICATOR_MS: u64 = 3000;

const DEFAULT_GREETING: &str = "Hi! I'm Eva. Tell me about your company and the clients \
    you are looking for, then upload your invitee list and I'll find your best matches.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub chat_path: Option<String>,
    pub connection_string: Option<String>,
    pub request_timeout: Option<Duration>,
    pub greeting: String,
    pub typing_indicator: Duration,
    pub failure_policy: FailurePolicy,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub backend_url: Option<String>,
    pub connection_string: Option<String>,
    pub failure_policy: Option<FailurePolicy>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.evagent/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".evagent").join("config.toml"))
}

/// Load config from `~/.evagent/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `EvagentConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<EvagentConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(EvagentConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(EvagentConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: EvagentConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Evagent Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "http://localhost:8000"     # Or set EVAGENT_BACKEND_URL
# chat_path = "/chat/"
# connection_string = "endpoint;subscription-id;resource-group;workspace"
# request_timeout_secs = 120              # Unset = transport default

# [chat]
# greeting = "Hi! I'm Eva."
# typing_indicator_ms = 3000

# [wizard]
# failure_policy = "reenable"             # "reenable" or "lockout"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &EvagentConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Backend URL: CLI → env → config → default
    let backend_url = cli
        .backend_url
        .clone()
        .or_else(|| std::env::var("EVAGENT_BACKEND_URL").ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    // Connection string: CLI → env → config (pre-fills the gate form)
    let connection_string = cli
        .connection_string
        .clone()
        .or_else(|| std::env::var("EVAGENT_CONNECTION_STRING").ok())
        .or_else(|| config.backend.connection_string.clone());

    let failure_policy = cli
        .failure_policy
        .or(config.wizard.failure_policy)
        .unwrap_or_default();

    ResolvedConfig {
        backend_url,
        chat_path: config.backend.chat_path.clone(),
        connection_string,
        request_timeout: config
            .backend
            .request_timeout_secs
            .map(Duration::from_secs),
        greeting: config
            .chat
            .greeting
            .clone()
            .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        typing_indicator: Duration::from_millis(
            config
                .chat
                .typing_indicator_ms
                .unwrap_or(DEFAULT_TYPING_INDICATOR_MS),
        ),
        failure_policy,
    }
}
