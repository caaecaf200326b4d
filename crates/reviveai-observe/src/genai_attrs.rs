//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! These follow the OTel GenAI Semantic Conventions specification for consistent
//! LLM call instrumentation across the codebase. All constants are string slices
//! usable in `tracing::span!` and `tracing::info_span!` field names.

// --- Required attributes ---

/// The name of the operation being performed (e.g., "chat", "invoke_agent").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "openai").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

/// The model ID requested (e.g., "gpt-4.1-mini").
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The sampling temperature for the request.
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

/// The maximum number of output tokens requested.
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

/// The number of input tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// The finish reasons for the response (e.g., "end_turn", "tool_use").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

// --- Operation name values ---

/// Vision analysis of an uploaded product photo.
pub const OP_ANALYZE_IMAGE: &str = "analyze_image";

/// Listing content generation (structured or streamed).
pub const OP_GENERATE_CONTENT: &str = "generate_content";

/// Web research agent invocation.
pub const OP_INVOKE_AGENT: &str = "invoke_agent";

/// Candidate rerank for the carbon match.
pub const OP_RERANK: &str = "rerank";

/// Image generation or editing.
pub const OP_GENERATE_IMAGE: &str = "generate_image";
