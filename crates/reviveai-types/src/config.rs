//! Global configuration types for ReviveAI.
//!
//! `AppConfig` represents the top-level `config.toml` that controls server
//! binding, model selection per task, search localization, and the carbon
//! savings formula. All fields have sensible defaults so the file is
//! optional.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the ReviveAI service.
///
/// Loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Model selection per task.
    #[serde(default)]
    pub models: ModelConfig,

    /// Web search localization and result count.
    #[serde(default)]
    pub search: SearchConfig,

    /// Carbon footprint estimation knobs.
    #[serde(default)]
    pub carbon: CarbonConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            models: ModelConfig::default(),
            search: SearchConfig::default(),
            carbon: CarbonConfig::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Which hosted model handles each task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Vision analysis of product photos.
    #[serde(default = "default_vision_model")]
    pub vision: String,

    /// Listing content and social post generation.
    #[serde(default = "default_content_model")]
    pub content: String,

    /// Candidate rerank for carbon matching.
    #[serde(default = "default_rerank_model")]
    pub rerank: String,

    /// The web-search agent's reasoning model.
    #[serde(default = "default_agent_model")]
    pub agent: String,

    /// Image generation / editing model.
    #[serde(default = "default_image_model")]
    pub image: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vision: default_vision_model(),
            content: default_content_model(),
            rerank: default_rerank_model(),
            agent: default_agent_model(),
            image: default_image_model(),
        }
    }
}

fn default_vision_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_content_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_rerank_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_agent_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

/// Web search localization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Country code for localized results.
    #[serde(default = "default_country")]
    pub country: String,

    /// Result count per search (capped at 5 upstream).
    #[serde(default = "default_result_count")]
    pub result_count: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            result_count: default_result_count(),
        }
    }
}

fn default_country() -> String {
    "TW".to_string()
}

fn default_result_count() -> usize {
    5
}

/// Carbon estimation knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonConfig {
    /// Fraction of the matched footprint counted as saved.
    #[serde(default = "default_saving_ratio")]
    pub saving_ratio: f64,

    /// Nearest-neighbor candidates passed to the rerank model.
    #[serde(default = "default_candidates")]
    pub candidates: usize,
}

impl Default for CarbonConfig {
    fn default() -> Self {
        Self {
            saving_ratio: default_saving_ratio(),
            candidates: default_candidates(),
        }
    }
}

fn default_saving_ratio() -> f64 {
    crate::carbon::DEFAULT_SAVING_RATIO
}

fn default_candidates() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.models.vision, "gpt-4.1-mini");
        assert_eq!(config.search.country, "TW");
        assert_eq!(config.carbon.candidates, 10);
        assert!((config.carbon.saving_ratio - 0.50).abs() < f64::EPSILON);
    }

    #[test]
    fn test_app_config_deserialize_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.models.content, "gpt-4.1-nano");
    }

    #[test]
    fn test_app_config_deserialize_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
port = 9000

[models]
vision = "gpt-4o"

[carbon]
saving_ratio = 0.6
"#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.models.vision, "gpt-4o");
        // Unspecified fields keep their defaults
        assert_eq!(config.models.rerank, "gpt-4.1-nano");
        assert!((config.carbon.saving_ratio - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.carbon.candidates, 10);
    }

    #[test]
    fn test_app_config_serde_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.models.image, "gemini-2.5-flash-image");
    }
}
