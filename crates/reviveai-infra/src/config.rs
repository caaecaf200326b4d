//! Configuration and API key loading.
//!
//! Reads `config.toml` from the data directory (`~/.reviveai/` by default)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed. API keys come from the environment and
//! are wrapped in [`SecretString`] so they never land in Debug output.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use reviveai_types::config::AppConfig;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the Google (Gemini) API key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Environment variable holding the Brave Search subscription token.
pub const BRAVE_SEARCH_API_KEY_VAR: &str = "BRAVE_SEARCH_API_KEY";

/// Resolve the data directory.
///
/// `REVIVEAI_DATA_DIR` overrides; otherwise `~/.reviveai`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REVIVEAI_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reviveai")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Read a required API key from the environment.
///
/// Returns an error naming the variable so the operator knows what to set.
pub fn require_api_key(var: &str) -> anyhow::Result<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => anyhow::bail!("missing API key: set the {var} environment variable"),
    }
}

/// Read an optional API key from the environment.
pub fn optional_api_key(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}
