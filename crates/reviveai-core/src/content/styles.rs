//! Copy-style templates.
//!
//! Each style carries a display name, a system-prompt fragment steering the
//! model's voice, and two short example snippets shown few-shot. The
//! templates are keyed by the style enums in `reviveai-types`.

use reviveai_types::listing::{ContentStyle, SeekingStyle, SellingStyle};

/// A prompt template for one copy style.
#[derive(Debug, Clone, Copy)]
pub struct StyleTemplate {
    /// Display name interpolated into prompts (e.g. 「標準專業」).
    pub name: &'static str,
    /// Style guidance injected into the system prompt.
    pub guidance: &'static str,
    /// Two short few-shot example snippets.
    pub examples: [&'static str; 2],
}

/// Template for an auction-listing content style.
pub fn content_template(style: ContentStyle) -> StyleTemplate {
    match style {
        ContentStyle::Normal => StyleTemplate {
            name: "標準專業",
            guidance: "使用專業但易讀的語氣，重點清晰、資訊完整，兼顧吸引力與可信度。",
            examples: [
                "九成新 MacBook Air M1，效能依舊流暢，適合文書與輕度剪輯。",
                "原廠盒裝配件齊全，功能正常無維修史，誠可議價。",
            ],
        },
        ContentStyle::Casual => StyleTemplate {
            name: "輕鬆活潑",
            guidance: "語氣輕鬆、活潑、帶點幽默，多用口語和 emoji，像朋友推薦好物。",
            examples: [
                "這台小白筆電真的超能打 💪 背著到處跑一整天都沒問題！",
                "換新機才割愛，手刀帶走不後悔 🛒",
            ],
        },
        ContentStyle::Formal => StyleTemplate {
            name: "正式商務",
            guidance: "語氣正式、嚴謹，用詞精準，適合商務族群，避免 emoji 與口語。",
            examples: [
                "本商品為 2020 年購入之輕薄型筆記型電腦，保存良好，功能完備。",
                "規格與保固資訊詳列如下，歡迎來訊洽詢細節。",
            ],
        },
        ContentStyle::Story => StyleTemplate {
            name: "故事體驗",
            guidance: "以第一人稱描述與商品相處的故事與情境，營造情感連結後自然帶出規格。",
            examples: [
                "三年前它陪我完成了畢業專題，如今希望它能陪下一位主人完成新的目標。",
                "每天清晨的咖啡店寫作時光，都是這台筆電和我一起度過的。",
            ],
        },
    }
}

/// Template for a social selling-post style.
pub fn selling_template(style: SellingStyle) -> StyleTemplate {
    match style {
        SellingStyle::Normal => StyleTemplate {
            name: "標準實用",
            guidance: "平實自然的轉售口吻，清楚交代狀況、價格與交易方式。",
            examples: [
                "自用 MacBook Air M1 出售，九成新、功能正常，台北可面交 💻",
                "換機出清，盒裝齊全，誠可小議，私訊聊聊～",
            ],
        },
        SellingStyle::Storytelling => StyleTemplate {
            name: "故事體驗",
            guidance: "用一小段使用故事開場，再帶出商品與售價，溫暖有畫面感。",
            examples: [
                "它陪我跑遍三個城市的咖啡店，現在想找下一位旅伴 ☕",
                "當年存了三個月薪水帶它回家，如今希望它繼續被好好使用。",
            ],
        },
        SellingStyle::Minimalist => StyleTemplate {
            name: "簡約精要",
            guidance: "極簡條列，只留關鍵規格、狀況、價格與聯絡方式，惜字如金。",
            examples: [
                "MacBook Air M1｜8G/256G｜九成新｜$18,000｜面交",
                "少用近新，功能正常，私訊即售。",
            ],
        },
        SellingStyle::Bargain => StyleTemplate {
            name: "超值優惠",
            guidance: "強調超值與限時，營造「錯過可惜」的氛圍，但不浮誇造假。",
            examples: [
                "市價七折出清！功能完好只求快速脫手 🔥",
                "這價格真的佛，晚來只能哭 😭",
            ],
        },
    }
}

/// Template for a social seeking-post style.
pub fn seeking_template(style: SeekingStyle) -> StyleTemplate {
    match style {
        SeekingStyle::Normal => StyleTemplate {
            name: "標準親切",
            guidance: "親切自然地說明需求、預算與用途，像向朋友們求助。",
            examples: [
                "想找一台二手 MacBook Air 學程式，有要出售的朋友嗎？🙏",
                "誠徵狀況良好的二手腳踏車，通勤代步用。",
            ],
        },
        SeekingStyle::Urgent => StyleTemplate {
            name: "急需緊急",
            guidance: "強調時效與急迫，語氣懇切，清楚說明何時之前需要。",
            examples: [
                "急徵！這週五前需要一台投影機，拜託大家幫忙 🙏🔥",
                "明天面試急需正式西裝外套，尺寸 M，感謝救急！",
            ],
        },
        SeekingStyle::Budget => StyleTemplate {
            name: "預算有限",
            guidance: "誠實說明預算上限，歡迎小瑕疵品，強調物盡其用。",
            examples: [
                "學生黨預算 $3,000 內徵二手平板，功能正常就好 🙇",
                "小資徵電風扇，外觀舊沒關係，會轉就行。",
            ],
        },
        SeekingStyle::Collector => StyleTemplate {
            name: "收藏愛好",
            guidance: "表達對物件的熱愛與了解，強調願意善待收藏，吸引同好割愛。",
            examples: [
                "長期徵求早期 GameBoy 主機與卡帶，狀況好壞皆可聊 🎮",
                "徵 90 年代底片相機，收藏把玩用，懂的朋友私訊。",
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_content_style_has_template() {
        for style in [
            ContentStyle::Normal,
            ContentStyle::Casual,
            ContentStyle::Formal,
            ContentStyle::Story,
        ] {
            let t = content_template(style);
            assert!(!t.name.is_empty());
            assert!(!t.guidance.is_empty());
            assert!(t.examples.iter().all(|e| !e.is_empty()));
        }
    }

    #[test]
    fn test_every_selling_style_has_template() {
        for style in [
            SellingStyle::Normal,
            SellingStyle::Storytelling,
            SellingStyle::Minimalist,
            SellingStyle::Bargain,
        ] {
            assert!(!selling_template(style).name.is_empty());
        }
    }

    #[test]
    fn test_every_seeking_style_has_template() {
        for style in [
            SeekingStyle::Normal,
            SeekingStyle::Urgent,
            SeekingStyle::Budget,
            SeekingStyle::Collector,
        ] {
            assert!(!seeking_template(style).name.is_empty());
        }
    }
}
