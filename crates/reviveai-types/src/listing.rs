//! Listing content types for ReviveAI.
//!
//! These types model the generated marketplace copy: the structured
//! auction-site listing, social selling/seeking post parameters, the
//! copy-style selectors, and the NDJSON frames streamed back to clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::carbon::CarbonFootprint;

/// Copy style for auction-site listing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStyle {
    /// 標準專業
    Normal,
    /// 輕鬆活潑
    Casual,
    /// 正式商務
    Formal,
    /// 故事體驗
    Story,
}

impl ContentStyle {
    /// Parse a form value, falling back to `Normal` for unknown styles.
    pub fn from_param(s: &str) -> Self {
        s.parse().unwrap_or(ContentStyle::Normal)
    }
}

impl fmt::Display for ContentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentStyle::Normal => write!(f, "normal"),
            ContentStyle::Casual => write!(f, "casual"),
            ContentStyle::Formal => write!(f, "formal"),
            ContentStyle::Story => write!(f, "story"),
        }
    }
}

impl FromStr for ContentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(ContentStyle::Normal),
            "casual" => Ok(ContentStyle::Casual),
            "formal" => Ok(ContentStyle::Formal),
            "story" => Ok(ContentStyle::Story),
            other => Err(format!("invalid content style: '{other}'")),
        }
    }
}

/// Copy style for social selling posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellingStyle {
    /// 標準實用
    Normal,
    /// 故事體驗
    Storytelling,
    /// 簡約精要
    Minimalist,
    /// 超值優惠
    Bargain,
}

impl SellingStyle {
    /// Parse a form value, falling back to `Normal` for unknown styles.
    pub fn from_param(s: &str) -> Self {
        s.parse().unwrap_or(SellingStyle::Normal)
    }
}

impl fmt::Display for SellingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SellingStyle::Normal => write!(f, "normal"),
            SellingStyle::Storytelling => write!(f, "storytelling"),
            SellingStyle::Minimalist => write!(f, "minimalist"),
            SellingStyle::Bargain => write!(f, "bargain"),
        }
    }
}

impl FromStr for SellingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(SellingStyle::Normal),
            "storytelling" => Ok(SellingStyle::Storytelling),
            "minimalist" => Ok(SellingStyle::Minimalist),
            "bargain" => Ok(SellingStyle::Bargain),
            other => Err(format!("invalid selling style: '{other}'")),
        }
    }
}

/// Copy style for social seeking ("徵求") posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeekingStyle {
    /// 標準親切
    Normal,
    /// 急需緊急
    Urgent,
    /// 預算有限
    Budget,
    /// 收藏愛好
    Collector,
}

impl SeekingStyle {
    /// Parse a form value, falling back to `Normal` for unknown styles.
    pub fn from_param(s: &str) -> Self {
        s.parse().unwrap_or(SeekingStyle::Normal)
    }
}

impl fmt::Display for SeekingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeekingStyle::Normal => write!(f, "normal"),
            SeekingStyle::Urgent => write!(f, "urgent"),
            SeekingStyle::Budget => write!(f, "budget"),
            SeekingStyle::Collector => write!(f, "collector"),
        }
    }
}

impl FromStr for SeekingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(SeekingStyle::Normal),
            "urgent" => Ok(SeekingStyle::Urgent),
            "budget" => Ok(SeekingStyle::Budget),
            "collector" => Ok(SeekingStyle::Collector),
            other => Err(format!("invalid seeking style: '{other}'")),
        }
    }
}

/// Whether a seeking post asks to buy or to rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeekingKind {
    Buy,
    Rent,
}

impl SeekingKind {
    /// Parse a form value, falling back to `Buy`.
    pub fn from_param(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "rent" => SeekingKind::Rent,
            _ => SeekingKind::Buy,
        }
    }
}

/// The five AIDA/FAB sections of an optimized product description.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListingDescription {
    /// 商品基本資訊，包括規格、材料、尺寸等。
    pub basic_information: String,
    /// 商品特色與賣點，強調產品的獨特優勢和競爭力。
    pub features_and_benefits: String,
    /// 商品現況詳細說明，包括使用痕跡等。
    pub current_status: String,
    /// 永續價值，連結至相關的 SDGs 目標。
    pub sustainable_value: String,
    /// 呼籲行動，總結購買優勢。
    pub call_to_action: String,
}

/// A fully structured auction-site listing produced by the content model.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListingContent {
    /// 優化商品標題，具有吸引力。
    pub optimized_product_title: String,
    pub optimized_product_description: ListingDescription,
}

/// Parameters for generating a social selling post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellingPostParams {
    /// Combined product description (user input + image analysis).
    pub description: String,
    pub price: String,
    pub contact_info: String,
    pub trade_method: String,
    pub style: SellingStyle,
}

/// Parameters for generating a social seeking post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeekingPostParams {
    /// Combined product description (user input + optional image analysis).
    pub product_description: String,
    pub purpose: String,
    pub expected_price: String,
    pub contact_info: String,
    pub trade_method: String,
    pub seeking_kind: SeekingKind,
    pub deadline: String,
    pub style: SeekingStyle,
}

/// Default contact info used when the form field is omitted.
pub const DEFAULT_CONTACT_INFO: &str = "請私訊詳詢";
/// Default trade method used when the form field is omitted.
pub const DEFAULT_TRADE_METHOD: &str = "面交/郵寄皆可";
/// Default seeking deadline used when the form field is omitted.
pub const DEFAULT_DEADLINE: &str = "越快越好";

/// One newline-delimited JSON frame of a streaming listing response.
///
/// The stream carries exactly one `metadata` frame, any number of
/// `content` frames, and a terminating `end` (or `error`) frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListingStreamFrame {
    Metadata {
        image_analysis: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        search_results: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        carbon_footprint: Option<CarbonFootprint>,
    },
    Content {
        chunk: String,
    },
    End,
    Error {
        error: String,
    },
}

impl ListingStreamFrame {
    /// Serialize this frame as one NDJSON line (newline included).
    pub fn to_ndjson_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"type":"error","error":"frame serialization failed"}"#.to_string()
        });
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_style_roundtrip() {
        for style in [
            ContentStyle::Normal,
            ContentStyle::Casual,
            ContentStyle::Formal,
            ContentStyle::Story,
        ] {
            let parsed: ContentStyle = style.to_string().parse().unwrap();
            assert_eq!(style, parsed);
        }
    }

    #[test]
    fn test_unknown_style_falls_back_to_normal() {
        assert_eq!(ContentStyle::from_param("meme"), ContentStyle::Normal);
        assert_eq!(SellingStyle::from_param("loud"), SellingStyle::Normal);
        assert_eq!(SeekingStyle::from_param(""), SeekingStyle::Normal);
    }

    #[test]
    fn test_seeking_kind_from_param() {
        assert_eq!(SeekingKind::from_param("rent"), SeekingKind::Rent);
        assert_eq!(SeekingKind::from_param("buy"), SeekingKind::Buy);
        assert_eq!(SeekingKind::from_param("anything"), SeekingKind::Buy);
    }

    #[test]
    fn test_listing_content_serde_shape() {
        let content = ListingContent {
            optimized_product_title: "MacBook Air M1 2020 8G/256G 九成新 二手筆電".into(),
            optimized_product_description: ListingDescription {
                basic_information: "規格".into(),
                features_and_benefits: "特色".into(),
                current_status: "現況".into(),
                sustainable_value: "永續".into(),
                call_to_action: "行動".into(),
            },
        };
        let json = serde_json::to_value(&content).unwrap();
        assert!(json["optimized_product_title"].is_string());
        assert!(json["optimized_product_description"]["basic_information"].is_string());
        let parsed: ListingContent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.optimized_product_description.call_to_action, "行動");
    }

    #[test]
    fn test_listing_content_schema_forbids_extras() {
        let schema = schemars::schema_for!(ListingContent);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["additionalProperties"], serde_json::json!(false));
    }

    #[test]
    fn test_stream_frame_ndjson_lines() {
        let frame = ListingStreamFrame::Content {
            chunk: "hello".into(),
        };
        let line = frame.to_ndjson_line();
        assert!(line.ends_with('\n'));
        assert!(line.contains("\"type\":\"content\""));

        let end = ListingStreamFrame::End.to_ndjson_line();
        assert_eq!(end.trim(), r#"{"type":"end"}"#);
    }

    #[test]
    fn test_metadata_frame_omits_absent_fields() {
        let frame = ListingStreamFrame::Metadata {
            image_analysis: "分析".into(),
            search_results: None,
            carbon_footprint: None,
        };
        let line = frame.to_ndjson_line();
        assert!(!line.contains("search_results"));
        assert!(!line.contains("carbon_footprint"));
    }
}
