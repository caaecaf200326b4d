//! Web search types for the product research agent.

use serde::{Deserialize, Serialize};

/// The product report produced by the web-search agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Markdown report: intro, specs, features, review summary, sources.
    pub text: String,
    /// Number of tool invocations the agent made to produce the report.
    pub tool_invocations: usize,
}

/// A single web search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl WebSearchResult {
    /// Render a numbered markdown entry for this hit.
    pub fn to_markdown(&self, index: usize) -> String {
        format!(
            "### {}. {}\n{}\nURL: {}\n\n",
            index, self.title, self.description, self.url
        )
    }
}
