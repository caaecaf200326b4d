//! Configuration types and per-provider defaults for OpenAI-compatible providers.
//!
//! Each provider that speaks the OpenAI chat completions protocol gets a factory
//! function returning an [`OpenAiCompatConfig`] with the correct base URL and
//! capabilities.

use secrecy::SecretString;

use reviveai_types::llm::ProviderCapabilities;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "gemini").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Default model when a request leaves the model field empty.
    pub model: String,
    /// What this provider supports.
    pub capabilities: ProviderCapabilities,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`
/// Capabilities: streaming, tool calling, vision; 128K context, 16K output.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            tool_calling: true,
            vision: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

/// Google Gemini default configuration (OpenAI-compatible beta endpoint).
///
/// Base URL: `https://generativelanguage.googleapis.com/v1beta/openai`
/// Capabilities: streaming, tool calling, vision; 1M context, 64K output.
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "gemini".into(),
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai".into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            tool_calling: true,
            vision: true,
            max_context_tokens: 1_000_000,
            max_output_tokens: 65_536,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let config = openai_defaults(SecretString::from("sk-test"), "gpt-4.1-mini");
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4.1-mini");
        assert!(config.capabilities.streaming);
        assert!(config.capabilities.tool_calling);
        assert!(config.capabilities.vision);
        assert_eq!(config.capabilities.max_context_tokens, 128_000);
        assert_eq!(config.capabilities.max_output_tokens, 16_384);
    }

    #[test]
    fn test_gemini_defaults() {
        let config = gemini_defaults(SecretString::from("gemini-key"), "gemini-2.5-flash");
        assert_eq!(config.provider_name, "gemini");
        assert!(config.base_url.contains("generativelanguage.googleapis.com"));
        assert_eq!(config.capabilities.max_context_tokens, 1_000_000);
        assert_eq!(config.capabilities.max_output_tokens, 65_536);
    }
}
