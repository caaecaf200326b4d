//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI and Google Gemini
//! (OpenAI-compatible beta endpoint) from one codebase via configurable
//! base URLs and factory functions.
//!
//! Uses [`async_openai`] for type-safe request/response handling and
//! built-in SSE streaming. Vision requests become content-part arrays with
//! `data:` URLs, structured output maps to a strict JSON-schema response
//! format, and tool calling round-trips through the chat tool protocol.

pub mod config;
pub mod streaming;

use std::pin::Pin;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestToolMessage,
    ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    ChatCompletionStreamOptions, ChatCompletionTool, ChatCompletionTools,
    CreateChatCompletionRequest, FinishReason, FunctionCall, FunctionObject, ImageUrl,
    ResponseFormat, ResponseFormatJsonSchema,
};
use futures_util::Stream;
use secrecy::ExposeSecret;

use reviveai_core::llm::LlmProvider;
use reviveai_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities,
    StopReason, StreamEvent, ToolCall, Usage,
};

use self::config::OpenAiCompatConfig;
use self::streaming::map_openai_stream;

/// Unified provider for any OpenAI-compatible API.
///
/// Supports: OpenAI, Google Gemini (OpenAI-compatible beta endpoint).
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            capabilities: config.capabilities,
        }
    }

    /// Create an OpenAI provider.
    ///
    /// Uses `https://api.openai.com/v1` as the base URL.
    pub fn openai(api_key: secrecy::SecretString, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    /// Create a Google Gemini provider (OpenAI-compatible beta endpoint).
    ///
    /// Uses `https://generativelanguage.googleapis.com/v1beta/openai` as the base URL.
    pub fn gemini(api_key: secrecy::SecretString, model: &str) -> Self {
        Self::new(config::gemini_defaults(api_key, model))
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        // System message
        if let Some(ref system) = request.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }

        // Conversation messages
        for msg in &request.messages {
            let oai_msg = match msg.role {
                MessageRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    },
                ),
                MessageRole::User => {
                    let content = if msg.images.is_empty() {
                        ChatCompletionRequestUserMessageContent::Text(msg.content.clone())
                    } else {
                        // Text part followed by one image part per attachment
                        let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> =
                            vec![ChatCompletionRequestUserMessageContentPart::Text(
                                ChatCompletionRequestMessageContentPartText {
                                    text: msg.content.clone(),
                                },
                            )];
                        for image in &msg.images {
                            parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                                ChatCompletionRequestMessageContentPartImage {
                                    image_url: ImageUrl {
                                        url: format!(
                                            "data:{};base64,{}",
                                            image.media_type, image.data
                                        ),
                                        detail: None,
                                    },
                                },
                            ));
                        }
                        ChatCompletionRequestUserMessageContent::Array(parts)
                    };
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content,
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    let tool_calls = if msg.tool_calls.is_empty() {
                        None
                    } else {
                        Some(
                            msg.tool_calls
                                .iter()
                                .map(|tc| {
                                    ChatCompletionMessageToolCalls::Function(
                                        ChatCompletionMessageToolCall {
                                            id: tc.id.clone(),
                                            function: FunctionCall {
                                                name: tc.name.clone(),
                                                arguments: tc.input.to_string(),
                                            },
                                        },
                                    )
                                })
                                .collect(),
                        )
                    };
                    let content = if msg.content.is_empty() {
                        None
                    } else {
                        Some(ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        ))
                    };
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content,
                            refusal: None,
                            name: None,
                            audio: None,
                            tool_calls,
                            function_call: None,
                        },
                    )
                }
                MessageRole::Tool => {
                    let tool_call_id = msg.tool_call_id.clone().ok_or_else(|| {
                        LlmError::InvalidRequest(
                            "tool message is missing tool_call_id".to_string(),
                        )
                    })?;
                    ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                        content: ChatCompletionRequestToolMessageContent::Text(
                            msg.content.clone(),
                        ),
                        tool_call_id,
                    })
                }
            };
            messages.push(oai_msg);
        }

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let mut req = CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        // Tool definitions
        if !request.tools.is_empty() {
            req.tools = Some(
                request
                    .tools
                    .iter()
                    .map(|t| {
                        ChatCompletionTools::Function(ChatCompletionTool {
                            function: FunctionObject {
                                name: t.name.clone(),
                                description: Some(t.description.clone()),
                                parameters: Some(t.parameters.clone()),
                                strict: None,
                            },
                        })
                    })
                    .collect(),
            );
        }

        // Structured output
        if let Some(ref output) = request.output_schema {
            req.response_format = Some(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: output.name.clone(),
                    description: None,
                    schema: Some(output.schema.clone()),
                    strict: Some(true),
                },
            });
        }

        // Streaming configuration
        if stream {
            req.stream = Some(true);
            req.stream_options = Some(ChatCompletionStreamOptions {
                include_usage: Some(true),
                include_obfuscation: None,
            });
        }

        Ok(req)
    }
}

// OpenAiCompatibleProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state including the API key inside the
// async-openai Client.

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request, false)?;

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        // Extract content from the first choice
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        // Extract tool calls, parsing the accumulated JSON arguments
        let tool_calls = response
            .choices
            .first()
            .and_then(|c| c.message.tool_calls.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let input = if tc.function.arguments.is_empty() {
                    serde_json::Value::Object(Default::default())
                } else {
                    serde_json::from_str(&tc.function.arguments).map_err(|e| {
                        LlmError::Deserialization(format!(
                            "tool call arguments for '{}': {e}",
                            tc.function.name
                        ))
                    })?
                };
                Ok(ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    input,
                })
            })
            .collect::<Result<Vec<_>, LlmError>>()?;

        // Map finish reason
        let stop_reason = response
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .map(|fr| match fr {
                FinishReason::Stop => StopReason::EndTurn,
                FinishReason::Length => StopReason::MaxTokens,
                FinishReason::ToolCalls => StopReason::ToolUse,
                FinishReason::ContentFilter => StopReason::EndTurn,
                FinishReason::FunctionCall => StopReason::ToolUse,
            })
            .unwrap_or(StopReason::EndTurn);

        // Extract usage
        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            tool_calls,
            usage,
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        // Build the request. If it fails, return a stream that immediately errors.
        let oai_request = match self.build_request(&request, true) {
            Ok(req) => req,
            Err(e) => {
                return Box::pin(futures_util::stream::once(async move { Err(e) }));
            }
        };

        // Clone the client for the 'static stream closure
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let oai_stream = client
                .chat()
                .create_stream(oai_request)
                .await
                .map_err(map_openai_error)?;

            let mut inner = map_openai_stream(oai_stream);

            use futures_util::StreamExt;
            while let Some(event) = inner.next().await {
                match event {
                    Ok(ev) => yield ev,
                    Err(e) => Err(e)?,
                }
            }
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 => LlmError::AuthenticationFailed,
                    429 => LlmError::RateLimited {
                        retry_after_ms: None,
                    },
                    529 => LlmError::Overloaded(err.to_string()),
                    _ => LlmError::Provider {
                        message: err.to_string(),
                    },
                }
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::StreamError(stream_err) => LlmError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviveai_types::llm::{ImageAttachment, Message, OutputSchema, ToolDefinition};
    use secrecy::SecretString;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::openai(SecretString::from("sk-test"), "gpt-4.1-mini")
    }

    fn base_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4.1-mini".to_string(),
            messages: vec![Message::text(MessageRole::User, "Hello")],
            system: Some("Be helpful".to_string()),
            max_tokens: 1024,
            temperature: Some(0.7),
            stream: false,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: None,
        }
    }

    #[test]
    fn test_openai_factory() {
        let provider = provider();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model, "gpt-4.1-mini");
        assert!(provider.capabilities().streaming);
        assert!(provider.capabilities().vision);
    }

    #[test]
    fn test_gemini_factory() {
        let provider =
            OpenAiCompatibleProvider::gemini(SecretString::from("key"), "gemini-2.5-flash");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.capabilities().max_context_tokens, 1_000_000);
    }

    #[test]
    fn test_build_request_messages() {
        let oai_req = provider().build_request(&base_request(), false).unwrap();
        assert_eq!(oai_req.model, "gpt-4.1-mini");
        // 1 system + 1 conversation = 2 messages
        assert_eq!(oai_req.messages.len(), 2);
        assert_eq!(oai_req.max_completion_tokens, Some(1024));
        assert!(oai_req.stream.is_none());
        assert!(oai_req.tools.is_none());
        assert!(oai_req.response_format.is_none());
    }

    #[test]
    fn test_build_request_streaming() {
        let mut request = base_request();
        request.stream = true;
        let oai_req = provider().build_request(&request, true).unwrap();
        assert_eq!(oai_req.stream, Some(true));
        let opts = oai_req.stream_options.unwrap();
        assert_eq!(opts.include_usage, Some(true));
    }

    #[test]
    fn test_build_request_with_image() {
        let mut request = base_request();
        request.messages = vec![Message::user_with_image(
            "analyze",
            ImageAttachment {
                media_type: "image/jpeg".into(),
                data: "Zm9v".into(),
            },
        )];
        let oai_req = provider().build_request(&request, false).unwrap();

        // System + user-with-parts
        assert_eq!(oai_req.messages.len(), 2);
        match &oai_req.messages[1] {
            ChatCompletionRequestMessage::User(user) => match &user.content {
                ChatCompletionRequestUserMessageContent::Array(parts) => {
                    assert_eq!(parts.len(), 2);
                    match &parts[1] {
                        ChatCompletionRequestUserMessageContentPart::ImageUrl(img) => {
                            assert!(img.image_url.url.starts_with("data:image/jpeg;base64,Zm9v"));
                        }
                        other => panic!("expected image part, got {other:?}"),
                    }
                }
                other => panic!("expected content parts, got {other:?}"),
            },
            other => panic!("expected user message, got {other:?}"),
        }
    }

    #[test]
    fn test_build_request_with_tools() {
        let mut request = base_request();
        request.tools = vec![ToolDefinition {
            name: "brave_search".into(),
            description: "web search".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let oai_req = provider().build_request(&request, false).unwrap();
        let tools = oai_req.tools.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "brave_search");
    }

    #[test]
    fn test_build_request_with_output_schema() {
        let mut request = base_request();
        request.output_schema = Some(OutputSchema {
            name: "product_selection".into(),
            schema: serde_json::json!({"type": "object"}),
        });
        let oai_req = provider().build_request(&request, false).unwrap();
        match oai_req.response_format {
            Some(ResponseFormat::JsonSchema { json_schema }) => {
                assert_eq!(json_schema.name, "product_selection");
                assert_eq!(json_schema.strict, Some(true));
                assert!(json_schema.schema.is_some());
            }
            other => panic!("expected json schema response format, got {other:?}"),
        }
    }

    #[test]
    fn test_build_request_tool_result_roundtrip() {
        let mut request = base_request();
        request.messages = vec![
            Message::text(MessageRole::User, "search this"),
            Message::assistant_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "brave_search".into(),
                    input: serde_json::json!({"query": "q"}),
                }],
            ),
            Message::tool_result("call_1", "results here"),
        ];
        let oai_req = provider().build_request(&request, false).unwrap();
        // system + user + assistant + tool
        assert_eq!(oai_req.messages.len(), 4);
        match &oai_req.messages[3] {
            ChatCompletionRequestMessage::Tool(tool) => {
                assert_eq!(tool.tool_call_id, "call_1");
            }
            other => panic!("expected tool message, got {other:?}"),
        }
    }

    #[test]
    fn test_build_request_tool_message_requires_call_id() {
        let mut request = base_request();
        request.messages = vec![Message {
            role: MessageRole::Tool,
            content: "orphan".into(),
            images: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }];
        let err = provider().build_request(&request, false).unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let mut request = base_request();
        request.model = String::new();
        let oai_req = provider().build_request(&request, false).unwrap();
        assert_eq!(oai_req.model, "gpt-4.1-mini");
    }

    #[test]
    fn test_map_openai_error_api_auth() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Incorrect API key provided".to_string(),
            r#type: Some("authentication_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_map_openai_error_rate_limit() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Rate limit exceeded".to_string(),
            r#type: Some("rate_limit_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::RateLimited { .. }));
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        use async_openai::error::OpenAIError;
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
