//! Webpage fetch tool.
//!
//! Fetches a page with a short timeout and extracts the readable content
//! for the agent model: title plus main-content text harvested from
//! `<article>`/`<main>` when present, paragraph/heading/list text
//! otherwise. Failures (timeouts, HTTP errors, unextractable pages) are
//! reported as text in the tool output.

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};

use reviveai_core::search::WebTool;

/// Page fetch timeout. Slow pages are skipped rather than waited on.
const FETCH_TIMEOUT: Duration = Duration::from_secs(4);

/// Cap on extracted content handed back to the model.
const MAX_CONTENT_CHARS: usize = 10_000;

/// User agent sent with page fetches.
const USER_AGENT: &str = "Mozilla/5.0 ReviveAI Web Fetcher (+https://github.com/ReviveAI)";

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("invalid whitespace regex"));

static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid blank line regex"));

/// Webpage fetch tool with readable-content extraction.
pub struct FetchWebpageTool {
    client: reqwest::Client,
}

impl FetchWebpageTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to create reqwest client");

        Self { client }
    }

    async fn fetch(&self, url: &str, raw_html: bool) -> String {
        tracing::debug!(url, "fetching webpage");

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return "錯誤: 網頁載入超時（超過4秒）:此網頁可能響應速度較慢或暫時無法訪問。"
                    .to_string();
            }
            Err(e) => return format!("抓取網頁時發生錯誤: {e}\n\n網頁: {url}"),
        };

        if !response.status().is_success() {
            return format!(
                "錯誤: 無法獲取頁面，HTTP狀態碼 {}",
                response.status().as_u16()
            );
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let html = match response.text().await {
            Ok(body) => body,
            Err(e) => return format!("抓取網頁時發生錯誤: {e}\n\n網頁: {url}"),
        };

        let is_html = ["text/html", "application/xhtml+xml"]
            .iter()
            .any(|ct| content_type.contains(ct));

        if raw_html || !is_html {
            let truncated: String = html.chars().take(MAX_CONTENT_CHARS).collect();
            return format!("## 網頁原始內容: {url}\n\n```html\n{truncated}...\n```");
        }

        match extract_readable(&html) {
            Some((title, text)) => {
                format!("## 網頁內容: {title}\n\n來源: {url}\n\n{text}")
            }
            None => format!("錯誤: 無法從網頁提取有意義的內容: {url}"),
        }
    }
}

impl Default for FetchWebpageTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the page title and readable body text.
///
/// Prefers `<article>`/`<main>` containers; falls back to harvesting
/// paragraphs, headings and list items across the page. Returns `None`
/// when nothing textual survives.
fn extract_readable(html: &str) -> Option<(String, String)> {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").ok()?;
    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "無標題".to_string());

    // Main-content containers first
    let container_selector = Selector::parse("article, main").ok()?;
    let mut text = String::new();

    if let Some(container) = document.select(&container_selector).next() {
        collect_text(container.text(), &mut text);
    } else {
        let fallback_selector = Selector::parse("p, h1, h2, h3, li").ok()?;
        for element in document.select(&fallback_selector) {
            collect_text(element.text(), &mut text);
        }
    }

    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    let text = BLANK_LINE_RUNS.replace_all(&text, "\n\n");
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    let truncated: String = text.chars().take(MAX_CONTENT_CHARS).collect();
    Some((title, truncated))
}

fn collect_text<'a>(fragments: impl Iterator<Item = &'a str>, out: &mut String) {
    for fragment in fragments {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
}

impl WebTool for FetchWebpageTool {
    fn name(&self) -> &str {
        "fetch_webpage"
    }

    fn description(&self) -> &str {
        "抓取網頁內容並提取主要文字，用於獲取產品的詳細資訊。"
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "要抓取的網頁 URL"
                },
                "raw_html": {
                    "type": "boolean",
                    "description": "是否返回原始 HTML 而不是提取的內容"
                }
            },
            "required": ["url"]
        })
    }

    fn invoke(
        &self,
        args: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = String> + Send + '_>> {
        Box::pin(async move {
            let Some(url) = args.get("url").and_then(|v| v.as_str()) else {
                return "錯誤: 缺少 url 參數".to_string();
            };
            let raw_html = args
                .get("raw_html")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            self.fetch(url, raw_html).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_readable_prefers_article() {
        let html = r#"<html><head><title>產品評測</title></head><body>
            <nav>選單 選單 選單</nav>
            <article><p>這是主要內容。</p><p>第二段。</p></article>
            <footer>頁尾雜訊</footer>
        </body></html>"#;

        let (title, text) = extract_readable(html).unwrap();
        assert_eq!(title, "產品評測");
        assert!(text.contains("這是主要內容。"));
        assert!(text.contains("第二段。"));
        assert!(!text.contains("選單"));
        assert!(!text.contains("頁尾雜訊"));
    }

    #[test]
    fn test_extract_readable_falls_back_to_paragraphs() {
        let html = r#"<html><head><title>T</title></head><body>
            <h1>標題</h1>
            <p>段落文字。</p>
            <ul><li>清單項目</li></ul>
        </body></html>"#;

        let (_, text) = extract_readable(html).unwrap();
        assert!(text.contains("標題"));
        assert!(text.contains("段落文字。"));
        assert!(text.contains("清單項目"));
    }

    #[test]
    fn test_extract_readable_empty_page() {
        let html = "<html><head><title>Empty</title></head><body></body></html>";
        assert!(extract_readable(html).is_none());
    }

    #[test]
    fn test_extract_readable_missing_title() {
        let html = "<html><body><p>內容</p></body></html>";
        let (title, _) = extract_readable(html).unwrap();
        assert_eq!(title, "無標題");
    }

    #[tokio::test]
    async fn test_missing_url_reported_in_output() {
        let tool = FetchWebpageTool::new();
        let out = tool.invoke(serde_json::json!({})).await;
        assert!(out.contains("缺少 url"));
    }

    #[test]
    fn test_parameters_schema_requires_url() {
        let tool = FetchWebpageTool::new();
        let params = tool.parameters();
        assert_eq!(params["required"][0], "url");
    }
}
