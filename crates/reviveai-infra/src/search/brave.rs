//! Brave Search web tool.
//!
//! Calls the Brave Search API and renders the hits as a markdown block the
//! agent model can read. Failures (missing key, HTTP errors) are reported
//! as text in the tool output -- the model sees them and adapts.

use std::future::Future;
use std::pin::Pin;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use reviveai_core::search::WebTool;
use reviveai_types::search::WebSearchResult;

/// Maximum results requested upstream regardless of the configured count.
const MAX_RESULTS: usize = 5;

/// Brave Search API endpoint.
const SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

#[derive(Deserialize)]
struct BraveResponse {
    web: Option<BraveWebSection>,
}

#[derive(Deserialize)]
struct BraveWebSection {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
}

/// Web search tool backed by the Brave Search API.
pub struct BraveSearchTool {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    country: String,
    count: usize,
}

impl BraveSearchTool {
    /// Create the tool. A missing API key is tolerated at construction and
    /// reported in tool output at invocation time, so the rest of the
    /// pipeline still works without search.
    pub fn new(api_key: Option<SecretString>, country: impl Into<String>, count: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            country: country.into(),
            count: count.min(MAX_RESULTS),
        }
    }

    /// Run the search and format results for the model.
    async fn search(&self, query: &str, count: usize) -> String {
        let Some(ref api_key) = self.api_key else {
            return "錯誤: 找不到 Brave Search API 金鑰。請設定 BRAVE_SEARCH_API_KEY 環境變數。"
                .to_string();
        };

        tracing::debug!(query, "brave search");

        let count_param = count.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .header("Accept", "application/json")
            .header("Accept-Encoding", "gzip")
            .header("X-Subscription-Token", api_key.expose_secret())
            .query(&[
                ("q", query),
                ("count", count_param.as_str()),
                ("country", self.country.as_str()),
                ("result_filter", "web"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return format!("搜尋時發生錯誤: {e}"),
        };

        if !response.status().is_success() {
            return format!("搜尋錯誤: HTTP狀態碼 {}", response.status().as_u16());
        }

        let data: BraveResponse = match response.json().await {
            Ok(d) => d,
            Err(e) => return format!("搜尋時發生錯誤: {e}"),
        };

        let mut formatted = format!("## 搜尋結果：\"{query}\"\n\n");

        let results = data.web.map(|w| w.results).unwrap_or_default();
        if results.is_empty() {
            formatted.push_str("找不到相關結果。\n");
            return formatted;
        }

        for (idx, result) in results.into_iter().take(count).enumerate() {
            let hit = WebSearchResult {
                title: if result.title.is_empty() {
                    "無標題".to_string()
                } else {
                    result.title
                },
                description: if result.description.is_empty() {
                    "無描述".to_string()
                } else {
                    result.description
                },
                url: result.url,
            };
            formatted.push_str(&hit.to_markdown(idx + 1));
        }

        formatted
    }
}

impl WebTool for BraveSearchTool {
    fn name(&self) -> &str {
        "brave_search"
    }

    fn description(&self) -> &str {
        "使用 Brave Search API 執行網路搜尋，返回包含標題、描述和 URL 的搜尋結果。"
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "搜尋查詢字串"
                },
                "count": {
                    "type": "integer",
                    "description": "要返回的結果數量 (1-5)"
                }
            },
            "required": ["query"]
        })
    }

    fn invoke(
        &self,
        args: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = String> + Send + '_>> {
        Box::pin(async move {
            let Some(query) = args.get("query").and_then(|v| v.as_str()) else {
                return "錯誤: 缺少 query 參數".to_string();
            };
            let count = args
                .get("count")
                .and_then(|v| v.as_u64())
                .map(|c| (c as usize).clamp(1, MAX_RESULTS))
                .unwrap_or(self.count);

            self.search(query, count).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_schema_requires_query() {
        let tool = BraveSearchTool::new(None, "TW", 5);
        let params = tool.parameters();
        assert_eq!(params["required"][0], "query");
        assert_eq!(params["properties"]["query"]["type"], "string");
    }

    #[tokio::test]
    async fn test_missing_api_key_reported_in_output() {
        let tool = BraveSearchTool::new(None, "TW", 5);
        let out = tool
            .invoke(serde_json::json!({"query": "macbook"}))
            .await;
        assert!(out.contains("BRAVE_SEARCH_API_KEY"));
    }

    #[tokio::test]
    async fn test_missing_query_reported_in_output() {
        let tool = BraveSearchTool::new(None, "TW", 5);
        let out = tool.invoke(serde_json::json!({})).await;
        assert!(out.contains("缺少 query"));
    }

    #[test]
    fn test_count_capped_at_five() {
        let tool = BraveSearchTool::new(None, "TW", 20);
        assert_eq!(tool.count, 5);
    }

    #[test]
    fn test_brave_response_parsing() {
        let raw = r#"{
            "web": {
                "results": [
                    {"title": "A", "description": "desc", "url": "https://a"},
                    {"title": "B", "description": "", "url": "https://b"}
                ]
            }
        }"#;
        let parsed: BraveResponse = serde_json::from_str(raw).unwrap();
        let results = parsed.web.unwrap().results;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A");
        assert!(results[1].description.is_empty());
    }
}
