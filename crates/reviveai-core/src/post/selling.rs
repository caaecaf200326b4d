//! Social selling-post generation.
//!
//! Produces a single-paragraph, conversational zh-TW post for community
//! marketplaces (Facebook/Instagram style), with price, contact, trade
//! method, a light sustainability nudge, and 2-3 hashtags. Streaming and
//! non-streaming variants share the same prompt.

use std::pin::Pin;

use futures_util::Stream;
use tracing::{Instrument, info_span};

use reviveai_types::listing::SellingPostParams;
use reviveai_types::llm::{
    CompletionRequest, LlmError, Message, MessageRole, StreamEvent,
};

use crate::content::styles::selling_template;
use crate::llm::LlmProvider;

/// Generates social selling posts with a hosted text model.
pub struct SellingPostGenerator<P: LlmProvider> {
    provider: P,
    model: String,
}

impl<P: LlmProvider> SellingPostGenerator<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn build_request(&self, params: &SellingPostParams, search_results: &str, stream: bool) -> CompletionRequest {
        let template = selling_template(params.style);

        let system = format!(
            "#zh-tw\n\
             你是專業的社群平台二手商品銷售文案專家。\n\n\
             【文案特點】\n\
             1. 口語化、自然，就像朋友之間聊天的語氣\n\
             2. 簡短有力，避免過長或分段\n\
             3. 不要商業感，避免使用過度專業術語\n\
             4. 適量使用表情符號增加親和力\n\
             5. 突出商品狀況、價格和交易方式等實用信息\n\
             6. 突出購買二手商品的環保價值\n\n\
             【{}風格指引】\n{}\n\n\
             【範例參考】\n{},\n{}\n\n\
             【文案結構指引】\n\
             - 開頭簡短吸引注意力，可使用輕鬆的問候或引言\n\
             - 中間部分簡潔描述商品特點、狀況\n\
             - 結尾清楚標示價格、交易方式、聯絡方式\n\
             - 簡短加入環保效益，讓買家感覺做了好事\n\
             - 適當使用hashtag增加曝光度 (2-3個相關標籤)\n\n\
             生成的內容必須是單一段落，整體篇幅控制在300字以內，\
             就像一般人在社群上發文的風格，既親切又清楚。\n\
             請直接回覆完整的社群貼文內容，包含末尾的hashtag。",
            template.name, template.guidance, template.examples[0], template.examples[1]
        );

        let prompt = format!(
            "商品描述：{}\n\n\
             售價：{}\n\n\
             聯絡方式：{}\n\n\
             交易方式：{}\n\n\
             網路搜尋資訊：\n{}\n\n\
             請根據以上所有資訊，創建一段適合在社群平台(如Facebook、Instagram等)發佈的二手商品銷售文案。\n\
             依照系統提示中的【{}風格指引】來撰寫。\n\
             文案風格要自然、口語化，避免商業感，就像朋友之間分享一樣。\n\
             文案不需要分段，應該是一段連貫的文字。\n\
             請確保包含售價、聯絡方式和交易方式等重要資訊。\n\
             以輕鬆有趣的方式簡短呈現買二手商品的環保價值。\n\
             適當使用表情符號增加親和力，結尾加上2-3個相關hashtag。",
            params.description,
            params.price,
            params.contact_info,
            params.trade_method,
            search_results,
            template.name
        );

        CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::text(MessageRole::User, prompt)],
            system: Some(system),
            max_tokens: 1024,
            temperature: None,
            stream,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: None,
        }
    }

    /// Generate the full post in one call.
    pub async fn generate(
        &self,
        params: &SellingPostParams,
        search_results: &str,
    ) -> Result<String, LlmError> {
        let request = self.build_request(params, search_results, false);

        let span = info_span!(
            "gen_ai.selling_post",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            post.style = %params.style,
        );

        let response = self.provider.complete(&request).instrument(span).await?;
        Ok(response.content)
    }

    /// Stream the post as text deltas.
    pub fn stream(
        &self,
        params: &SellingPostParams,
        search_results: &str,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let request = self.build_request(params, search_results, true);
        self.provider.stream(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Mutex;

    use reviveai_types::listing::SellingStyle;
    use reviveai_types::llm::{
        CompletionResponse, ProviderCapabilities, StopReason, Usage,
    };

    struct CapturingProvider {
        last_request: Mutex<Option<CompletionRequest>>,
        capabilities: ProviderCapabilities,
    }

    impl CapturingProvider {
        fn new() -> Self {
            Self {
                last_request: Mutex::new(None),
                capabilities: ProviderCapabilities {
                    streaming: true,
                    tool_calling: false,
                    vision: false,
                    max_context_tokens: 128_000,
                    max_output_tokens: 16_384,
                },
            }
        }
    }

    impl LlmProvider for CapturingProvider {
        fn name(&self) -> &str {
            "capturing"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(CompletionResponse {
                id: "resp".into(),
                content: "出售 MacBook Air M1 #二手 #環保".into(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                tool_calls: Vec::new(),
                usage: Usage::default(),
            })
        }

        fn stream(
            &self,
            request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
            *self.last_request.lock().unwrap() = Some(request);
            Box::pin(futures_util::stream::empty())
        }
    }

    fn params() -> SellingPostParams {
        SellingPostParams {
            description: "macbook air m1 2020 8g 256g 使用兩年 背面小瑕疵".into(),
            price: "$18,000".into(),
            contact_info: "留言或私訊皆可".into(),
            trade_method: "可台北面交或郵寄".into(),
            style: SellingStyle::Bargain,
        }
    }

    #[tokio::test]
    async fn test_generate_includes_listing_facts() {
        let generator = SellingPostGenerator::new(CapturingProvider::new(), "gpt-4.1-nano");
        let post = generator.generate(&params(), "搜尋摘要").await.unwrap();
        assert!(post.contains("MacBook Air"));

        let request = generator.provider.last_request.lock().unwrap().clone().unwrap();
        assert!(!request.stream);
        let prompt = &request.messages[0].content;
        assert!(prompt.contains("售價：$18,000"));
        assert!(prompt.contains("交易方式：可台北面交或郵寄"));
        assert!(prompt.contains("網路搜尋資訊：\n搜尋摘要"));
        // Style template name flows into both prompts
        assert!(prompt.contains("超值優惠"));
        assert!(request.system.as_deref().unwrap().contains("超值優惠"));
    }

    #[tokio::test]
    async fn test_stream_sets_stream_flag() {
        let generator = SellingPostGenerator::new(CapturingProvider::new(), "gpt-4.1-nano");
        let _stream = generator.stream(&params(), "");
        let request = generator.provider.last_request.lock().unwrap().clone().unwrap();
        assert!(request.stream);
    }
}
