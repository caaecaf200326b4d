//! Product photo analysis via a vision-capable model.
//!
//! Sends the uploaded image with a fixed merchandising-analysis prompt and
//! returns the model's markdown report. The report is later prepended to
//! the user's own description for the downstream generators.

use base64::Engine as _;
use tracing::{Instrument, info_span};

use reviveai_types::llm::{CompletionRequest, ImageAttachment, LlmError, Message};

use crate::llm::LlmProvider;

/// System role text for the vision model.
const VISION_SYSTEM: &str = "你是一位專業的電商平台二手商品圖像分析專家，專門協助賣家優化商品呈現。\
你的任務是詳細分析圖片中的商品，並提供產品描述。";

/// The fixed analysis prompt. Asks for three sections only (basic info,
/// condition, selling points) and an explicit product-type statement so
/// the catalogue search downstream can match on type.
const VISION_PROMPT: &str = "\
#zh-tw
回應時請使用 Markdown 格式
請仔細分析圖片中的商品，並從以下幾個面向提供專業的觀察：

1. 商品基本資訊：
- 商品主要描述（**非常重要：必須明確標示這是什麼類型的產品**）
- 商品顏色
- 尺寸大小
- 品牌標誌

2. 商品狀況評估：
- 新舊保存程度
- 是否有明顯瑕疵
- 清潔程度評估

3. 商品特色重點
- 獨特設計或特色
- 視覺吸引點

注意事項：
- 產品類型識別很重要，請確保在分析中清楚說明這是什麼類型的產品，以利於資料庫中搜索。
- 請以結構化、易讀的方式呈現以上資訊，注重細節描述的精準度。
- 報告應只提供觀察到的具體資訊為基礎。
- 回傳的結果只需要以上3個項目，請不要提供額外的建議或道歉訊息
- 非常重要：回應時請使用 Markdown 格式";

/// Analyzes product photos with a vision-capable LLM.
pub struct VisionAnalyzer<P: LlmProvider> {
    provider: P,
    model: String,
}

impl<P: LlmProvider> VisionAnalyzer<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Analyze a product image and return the markdown report.
    ///
    /// `media_type` is the image MIME type from the upload (e.g.
    /// "image/jpeg").
    pub async fn analyze(&self, image: &[u8], media_type: &str) -> Result<String, LlmError> {
        let attachment = ImageAttachment {
            media_type: media_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(image),
        };

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::user_with_image(VISION_PROMPT, attachment)],
            system: Some(VISION_SYSTEM.to_string()),
            max_tokens: 1024,
            temperature: None,
            stream: false,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: None,
        };

        let span = info_span!(
            "gen_ai.analyze_image",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            image.bytes = image.len(),
        );

        let response = self.provider.complete(&request).instrument(span).await?;
        Ok(response.content)
    }
}

/// Combine the user's description with an image analysis report.
///
/// When the report is empty the description is passed through untouched.
pub fn combine_description(description: &str, image_analysis: &str) -> String {
    if image_analysis.is_empty() {
        description.to_string()
    } else {
        format!("商品資訊：\n{description}\n\n圖片分析結果:\n{image_analysis}")
    }
}

/// Combine a seeking request with an optional reference-image analysis.
pub fn combine_seeking_description(description: &str, image_analysis: &str) -> String {
    if image_analysis.is_empty() {
        description.to_string()
    } else {
        format!("徵求商品：\n{description}\n\n參考圖片分析:\n{image_analysis}")
    }
}
