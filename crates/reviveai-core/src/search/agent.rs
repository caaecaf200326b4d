//! Product research agent.
//!
//! A bounded tool loop over the provider's native tool calling: the model
//! is instructed to run one web search, then fetch the most relevant pages,
//! then write a product report. Each round's tool calls are executed and
//! appended as tool-result messages; the loop ends when the model answers
//! with plain text or the round budget runs out.

use tracing::{Instrument, info_span, warn};

use reviveai_types::error::SearchError;
use reviveai_types::llm::{CompletionRequest, Message, MessageRole};
use reviveai_types::search::SearchReport;

use crate::llm::LlmProvider;

use super::tools::{WebTool, tool_definition};

/// Maximum assistant/tool rounds before the loop gives up.
pub const MAX_TOOL_ROUNDS: usize = 4;

/// System prompt steering the research workflow: exactly one search, then
/// mandatory page fetches, then a structured report with sources.
const AGENT_SYSTEM: &str = "\
你是一個專業的產品研究助手，專門幫助用戶尋找和分析產品的詳細資訊。

請嚴格遵循以下工作流程，這是非常重要的：
1. 首先，使用最精準一組的關鍵詞，僅送出 1 次 brave_search 工具搜尋。
   - 注意：絕對不要發送 2 次搜尋請求(禁止用兩組關鍵字同時搜尋)，這會導致系統錯誤！

2. 分析搜尋結果後，繼續選擇 2-3 個最相關的權威網頁（官方網站、知名媒體或專業評測網站優先）

3. 繼續對每個選擇的網頁使用 fetch_webpage 工具獲取詳細內容。
   注意：這一步是**強制性且必須執行**的！不要跳過！
   如果第一個網頁無法獲取，請嘗試其他網頁，直到成功獲取至少一個網頁的內容。

4. 基於獲取的網頁內容，綜合分析並提供完整的產品報告。

你的報告應包含以下部分（以繁體中文回答）：
- 產品的基本介紹
- 產品規格
- 主要功能和特點
- 整體評價摘要
- 資訊來源參考（列出你使用的網頁URLs）

請保持客觀和準確，如果來源之間有衝突的資訊，請註明並提供多個觀點。";

/// Runs the bounded research loop against a tool-calling model.
pub struct SearchAgent<P: LlmProvider> {
    provider: P,
    model: String,
    tools: Vec<Box<dyn WebTool>>,
    max_rounds: usize,
}

impl<P: LlmProvider> SearchAgent<P> {
    pub fn new(provider: P, model: impl Into<String>, tools: Vec<Box<dyn WebTool>>) -> Self {
        Self {
            provider,
            model: model.into(),
            tools,
            max_rounds: MAX_TOOL_ROUNDS,
        }
    }

    /// Override the tool-round budget (tests and CLI experimentation).
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Research a product and return the model's report.
    pub async fn research(&self, query: &str) -> Result<SearchReport, SearchError> {
        let tool_defs: Vec<_> = self.tools.iter().map(|t| tool_definition(t.as_ref())).collect();

        let mut messages = vec![Message::text(
            MessageRole::User,
            format!(
                "請提供關於「{query}」的詳細產品資訊，依規定回答規格、特點和評價等，\
                 執行brave_search工具搜尋唯一1次，再用fetch_webpage工具獲取詳細內容。"
            ),
        )];

        let mut tool_invocations = 0usize;
        let mut last_content = String::new();

        for round in 0..self.max_rounds {
            let request = CompletionRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                system: Some(AGENT_SYSTEM.to_string()),
                max_tokens: 2048,
                temperature: None,
                stream: false,
                stop_sequences: None,
                tools: tool_defs.clone(),
                output_schema: None,
            };

            let span = info_span!(
                "gen_ai.invoke_agent",
                gen_ai.system = self.provider.name(),
                gen_ai.request.model = %request.model,
                agent.round = round,
            );

            let response = self.provider.complete(&request).instrument(span).await?;

            if response.tool_calls.is_empty() {
                // Final answer
                return Ok(SearchReport {
                    text: response.content,
                    tool_invocations,
                });
            }

            last_content = response.content.clone();
            let tool_calls = response.tool_calls.clone();
            messages.push(Message::assistant_tool_calls(response.content, tool_calls.clone()));

            for call in tool_calls {
                let output = match self.tools.iter().find(|t| t.name() == call.name) {
                    Some(tool) => {
                        let span = info_span!(
                            "agent.tool",
                            tool.name = %call.name,
                        );
                        tool.invoke(call.input.clone()).instrument(span).await
                    }
                    None => {
                        warn!(tool = %call.name, "model requested unknown tool");
                        format!("錯誤: 沒有名為 '{}' 的工具", call.name)
                    }
                };
                tool_invocations += 1;
                messages.push(Message::tool_result(call.id, output));
            }
        }

        // The round budget ran out mid-conversation. Return whatever prose
        // the model produced alongside its last tool request, if any.
        if last_content.trim().is_empty() {
            Err(SearchError::Exhausted(self.max_rounds))
        } else {
            Ok(SearchReport {
                text: last_content,
                tool_invocations,
            })
        }
    }
}
