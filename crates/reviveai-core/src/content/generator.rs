//! Listing content generation.
//!
//! Two modes, matching the two API surfaces:
//! - `generate`: one-shot structured output ([`ListingContent`]) enforced by
//!   a JSON schema on the provider side;
//! - `stream`: markdown sections streamed as text deltas, used by the NDJSON
//!   endpoint. The streaming prompt asks for five `#`-headed sections so the
//!   UI can split the title out while chunks are still arriving.

use std::pin::Pin;

use futures_util::Stream;
use tracing::{Instrument, info_span};

use reviveai_types::listing::{ContentStyle, ListingContent};
use reviveai_types::llm::{
    CompletionRequest, LlmError, Message, MessageRole, OutputSchema, StreamEvent,
};

use crate::llm::LlmProvider;

use super::styles::content_template;

/// System prompt for the structured one-shot generator. AIDA model + FAB
/// selling framework + SEO keyword guidance, verbatim strategy of the
/// marketing copy this service exists to produce.
const STRUCTURED_SYSTEM: &str = "\
#zh-tw
您是一位專精於永續發展的二手商品行銷專家，擅長運用AIDA模型和FAB銷售來優化商品文案，同時具備豐富的電商平台優化經驗。

【文案優化資訊來源】
1. 用戶提供的基本資訊
2. AI 圖像分析結果
3. 網路搜尋資訊（若有）

【文案策略核心】
1. AIDA模型應用：
- Attention(注意力)：使用吸引眼球的標題關鍵字和emoji
- Interest(興趣)：突出商品獨特賣點和稀有性
- Desire(慾望)：強調使用者痛點解決和情感連結
- Action(行動)：創造購買急迫感和獨特價值主張

2. FAB銷售法整合：
- Feature(特色)：詳述商品具體規格和特點
- Advantage(優勢)：說明此特色帶來的競爭優勢
- Benefit(效益)：強調對買家生活的實際效益

3. 關鍵字 SEO 策略：
- 自然融入核心關鍵字：通用名詞、高搜尋量
- 加入相關長尾關鍵字：特定需求、競爭較低
- 避免關鍵字堆砌

【注意事項】
1. 保持描述真實準確，不誇大或隱瞞缺陷，清楚標示為二手商品
2. 適度使用 emoji 增加可讀性，但不過度
3. 整合圖片訊息，標注任何使用痕跡或瑕疵，突出商品優勢特徵
4. 強調透過二手交易為永續發展做出的貢獻

請根據以上準則，為每件商品創造最優化的標題和描述，讓潛在買家產生強烈的購買意願，同時認同其永續價值。";

/// The markdown section headings the streaming prompt asks for.
pub const TITLE_HEADING: &str = "# 優化商品標題";

/// Generates auction-site listing copy with a hosted text model.
pub struct ContentGenerator<P: LlmProvider> {
    provider: P,
    model: String,
}

impl<P: LlmProvider> ContentGenerator<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// One-shot structured generation: title + five description sections.
    pub async fn generate(
        &self,
        description: &str,
        style: ContentStyle,
    ) -> Result<ListingContent, LlmError> {
        let template = content_template(style);
        let prompt = format!(
            "商品名稱：{description}\n\
             請根據以上所有資訊，創建符合「{}」風格的優化商品標題和描述。\n\
             風格指引：{}\n\
             特別注意：\n\
             1. 如果有搜尋資訊，請善用這些資訊來強化商品描述的專業性和準確性\n\
             2. 確保所有資訊的準確性，不要過度誇大\n\
             3. 重點突出二手商品的價值和環保意義",
            template.name, template.guidance
        );

        let schema = schemars::schema_for!(ListingContent);
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::text(MessageRole::User, prompt)],
            system: Some(STRUCTURED_SYSTEM.to_string()),
            max_tokens: 2048,
            temperature: None,
            stream: false,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: Some(OutputSchema {
                name: "product_schema".to_string(),
                schema: serde_json::to_value(&schema)
                    .map_err(|e| LlmError::InvalidRequest(e.to_string()))?,
            }),
        };

        let span = info_span!(
            "gen_ai.generate_content",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            content.style = %style,
        );

        let response = self.provider.complete(&request).instrument(span).await?;
        serde_json::from_str(&response.content)
            .map_err(|e| LlmError::Deserialization(format!("listing content: {e}")))
    }

    /// Streaming generation of the five `#`-headed markdown sections.
    ///
    /// `search_results` is the agent's product report, injected so the copy
    /// can cite real specs.
    pub fn stream(
        &self,
        description: &str,
        search_results: &str,
        style: ContentStyle,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let template = content_template(style);

        let system = format!(
            "#zh-tw 使用台灣繁體中文回答。\n\
             使用較口語的語氣，文字不要有機器人感。\n\
             {}\n\n\
             文案結構需包含：\n\
             \"# 優化商品標題\" (40-70字)\n\
             - 商品名稱 + 商品規格 + 商品特色 + 商品狀況描述 + 相關關鍵字\n\
             - 清楚標示為二手商品（及使用時間）\n\n\
             \"# 商品基本資訊\"：\n\
             - 使用條列式，清楚列出商品完整的基本資訊（規格、材質、尺寸等）\n\n\
             \"# 商品特色與賣點\"：\n\
             - 突出商品獨特優勢特色和競爭力，連結使用場景和情境\n\n\
             \"# 商品現況詳細說明\"：\n\
             - 描述商品現況、保存狀況，只需描述重點，不要太冗長\n\
             - 若是科技產品，應較仔細寫功能、性能的保存狀態\n\n\
             \"# 呼籲行動\"：\n\
             - 說服買家總結購買的優勢，創造稀缺性和急迫感\n\
             - 在結尾用 # 記號加入SEO關鍵字\n\n\
             【注意事項】\n\
             1. 保持描述真實準確，不誇大或隱瞞缺陷，清楚標示為二手商品\n\
             2. 適度使用 emoji 增加可讀性\n\
             3. 強調透過二手交易為永續發展做出的貢獻\n\
             4. 文案要放在拍賣平台上，目標讀者是二手買家，口吻需自然\n\n\
             重要！你必須按照指定格式輸出，每個部分都加上相應的標題。",
            template.guidance
        );

        let prompt = format!(
            "商品描述：{description}\n\n\
             網路搜尋資訊：\n{search_results}\n\n\
             請根據以上所有資訊，創建符合「{}」風格的商品標題和描述。\n\
             以下是這種風格的範例：\n{}\n{}\n\n\
             特別注意：\n\
             1. 善用網路搜尋資訊來強化商品描述的專業性和準確性\n\
             2. 確保所有資訊的準確性，不要過度誇大\n\
             3. 重點突出二手商品的價值和環保意義\n\
             4. 嚴格遵循指定的風格要求",
            template.name, template.examples[0], template.examples[1]
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::text(MessageRole::User, prompt)],
            system: Some(system),
            max_tokens: 2048,
            temperature: None,
            stream: true,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: None,
        };

        self.provider.stream(request)
    }
}

/// Split streamed markdown into the title line and the remaining body.
///
/// Finds the `# 優化商品標題` heading, takes the first non-empty line below
/// it as the title, and returns everything after that line as the body.
/// Content without the heading comes back with an empty title.
pub fn split_content_sections(content: &str) -> (String, String) {
    let lines: Vec<&str> = content.lines().collect();

    let Some(heading_idx) = lines.iter().position(|l| l.starts_with(TITLE_HEADING)) else {
        return (String::new(), content.to_string());
    };

    let mut title = String::new();
    let mut body_start = heading_idx + 1;

    for (offset, line) in lines[heading_idx + 1..].iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('#') {
            body_start = heading_idx + 1 + offset;
            break;
        }
        title = line.trim().to_string();
        body_start = heading_idx + 1 + offset + 1;
        break;
    }

    let body = lines[body_start..].join("\n");
    (title, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_content_sections() {
        let content = "# 優化商品標題\n\
                       九成新 MacBook Air M1 二手筆電\n\n\
                       # 商品基本資訊\n\
                       - 8G/256G\n";
        let (title, body) = split_content_sections(content);
        assert_eq!(title, "九成新 MacBook Air M1 二手筆電");
        assert!(body.contains("# 商品基本資訊"));
        assert!(!body.contains("九成新 MacBook Air M1 二手筆電"));
    }

    #[test]
    fn test_split_content_sections_blank_line_before_title() {
        let content = "# 優化商品標題\n\n\n標題在這\n# 商品基本資訊\n內容";
        let (title, body) = split_content_sections(content);
        assert_eq!(title, "標題在這");
        assert!(body.starts_with("# 商品基本資訊"));
    }

    #[test]
    fn test_split_content_sections_missing_heading() {
        let content = "沒有標題段落的內容";
        let (title, body) = split_content_sections(content);
        assert!(title.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_split_content_sections_heading_directly_followed_by_section() {
        // Model emitted the heading but no title line yet (mid-stream).
        let content = "# 優化商品標題\n# 商品基本資訊\n- 規格";
        let (title, body) = split_content_sections(content);
        assert!(title.is_empty());
        assert!(body.starts_with("# 商品基本資訊"));
    }
}
