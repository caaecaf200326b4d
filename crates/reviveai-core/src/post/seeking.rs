//! Social seeking-post ("徵求") generation.
//!
//! A buy request frames the sustainability angle around avoiding new
//! production; a rent request frames it around resource sharing. Unlike
//! selling posts there is no web-search input: the post describes what the
//! poster wants, not a product they own.

use tracing::{Instrument, info_span};

use reviveai_types::listing::{SeekingKind, SeekingPostParams};
use reviveai_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

use crate::content::styles::seeking_template;
use crate::llm::LlmProvider;

/// Generates social seeking posts with a hosted text model.
pub struct SeekingPostGenerator<P: LlmProvider> {
    provider: P,
    model: String,
}

impl<P: LlmProvider> SeekingPostGenerator<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Generate the seeking post.
    pub async fn generate(&self, params: &SeekingPostParams) -> Result<String, LlmError> {
        let template = seeking_template(params.style);

        let kind_guidance = match params.seeking_kind {
            SeekingKind::Rent => {
                "- 租借型：強調暫時性需求，說明使用時間，強調物盡其用、資源共享的永續理念"
            }
            SeekingKind::Buy => {
                "- 購買型：強調長期需求，說明使用計畫，強調二手選購減少新品生產的環保價值"
            }
        };
        let kind_label = match params.seeking_kind {
            SeekingKind::Rent => "租借",
            SeekingKind::Buy => "購買",
        };
        let kind_value = match params.seeking_kind {
            SeekingKind::Rent => "租借共享",
            SeekingKind::Buy => "購買二手商品",
        };

        let system = format!(
            "#zh-tw\n\
             你是專業的社群平台二手商品徵求文案專家。\n\n\
             【文案特點】\n\
             1. 對話感強，親切自然，就像跟朋友聊天，不要太討好、諂媚\n\
             2. 清晰表達需求和用途，讓讀者明確知道徵求什麼和為什麼需要\n\
             3. 突出環保價值和資源共享理念\n\
             4. 適量使用表情符號增加親和力\n\
             5. 清楚標示期望價格、交易地點、聯絡方式和時效性\n\n\
             【徵求類型差異】\n{kind_guidance}\n\n\
             【{}風格指引】\n{}\n\n\
             【範例參考】\n{},\n{}\n\n\
             【文案結構】\n\
             - 開頭：友善問候 + 簡短自我介紹 + 徵求目的\n\
             - 中間：詳細描述需求（品項/規格/狀況）+ 使用目的\n\
             - 結尾：清楚標示期望價格、交易地點、聯絡方式和時效性\n\
             - 末尾：簡短環保理念 + 2-3個相關標籤\n\n\
             生成的內容必須是單一段落，整體篇幅控制在300字以內，語氣親切自然。\n\
             請直接回覆完整的社群徵品貼文內容，包含末尾的hashtag。",
            template.name, template.guidance, template.examples[0], template.examples[1]
        );

        let prompt = format!(
            "徵求商品描述：{}\n\n\
             徵求目的：{}\n\n\
             期望價格：{}\n\n\
             交易方式：{}\n\n\
             聯絡方式：{}\n\n\
             徵求時效：{}\n\n\
             徵求類型：{kind_label}\n\n\
             請根據以上所有資訊，創建一段適合在社群平台(如Facebook、Instagram等)發佈的二手商品徵求文案。\n\
             文案風格要自然、親切有對話感，就像朋友之間分享一樣。\n\
             文案不需要分段，應該是一段連貫的文字。\n\
             請確保包含徵求目的、期望價格、聯絡方式和交易方式等重要資訊。\n\
             依照系統提示中的【{}風格指引】來撰寫。\n\
             以輕鬆有趣的方式簡短呈現{kind_value}的環保價值。\n\
             適當使用表情符號增加親和力，結尾加上2-3個相關hashtag。",
            params.product_description,
            params.purpose,
            params.expected_price,
            params.trade_method,
            params.contact_info,
            params.deadline,
            template.name
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::text(MessageRole::User, prompt)],
            system: Some(system),
            max_tokens: 1024,
            temperature: None,
            stream: false,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: None,
        };

        let span = info_span!(
            "gen_ai.seeking_post",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            post.style = %params.style,
        );

        let response = self.provider.complete(&request).instrument(span).await?;
        Ok(response.content)
    }
}
