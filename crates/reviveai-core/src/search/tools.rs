//! Web tool port for the research agent.

use std::future::Future;
use std::pin::Pin;

use reviveai_types::llm::ToolDefinition;

/// A tool the research agent can expose to the model.
///
/// `invoke` returns a boxed future because tools are held as trait objects
/// in the agent's tool list. Failures are reported as text in the returned
/// string -- the model reads them and adapts (retries another page, etc.),
/// so a tool error never aborts the agent loop.
pub trait WebTool: Send + Sync {
    /// Tool name as exposed to the model (e.g., "brave_search").
    fn name(&self) -> &str;

    /// Human-readable description the model uses to pick the tool.
    fn description(&self) -> &str;

    /// JSON Schema of the tool's arguments.
    fn parameters(&self) -> serde_json::Value;

    /// Invoke the tool with the model-supplied arguments.
    fn invoke(
        &self,
        args: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = String> + Send + '_>>;
}

/// Build the [`ToolDefinition`] advertised to the provider for a tool.
pub fn tool_definition(tool: &dyn WebTool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters(),
    }
}
