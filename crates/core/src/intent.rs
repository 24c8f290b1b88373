use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

pub const MAX_CHAT_INPUT_GRAPHEMES: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordResponse {
    pub keyword: String,
    pub response: String,
}

/// Keyword table behind the chat widget.
///
/// Entry order matters: when several keywords occur in the same input the
/// entry defined last wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTable {
    pub greeting: String,
    pub fallback: String,
    pub quick_replies: Vec<String>,
    pub entries: Vec<KeywordResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentMatch<'a> {
    pub keyword: Option<&'a str>,
    pub response: &'a str,
}

impl IntentMatch<'_> {
    pub fn is_fallback(&self) -> bool {
        self.keyword.is_none()
    }
}

impl ResponseTable {
    pub fn with_entry(mut self, keyword: &str, response: &str) -> Self {
        self.entries.push(KeywordResponse {
            keyword: keyword.to_lowercase(),
            response: response.to_string(),
        });
        self
    }
}

impl Default for ResponseTable {
    fn default() -> Self {
        Self {
            greeting: "Hello! I'm Safari, your virtual travel assistant. How can I help you plan your perfect Kenyan safari adventure?".to_string(),
            fallback: "That's a great question! I'd recommend speaking with our experts for detailed information. You can contact us through our booking form or call +254 700 123 456.".to_string(),
            quick_replies: vec![
                "Popular safari destinations".to_string(),
                "Best time to visit".to_string(),
                "Safari package prices".to_string(),
                "What to pack".to_string(),
            ],
            entries: Vec::new(),
        }
        .with_entry(
            "popular safari destinations",
            "Kenya's top safari destinations include:\n\n🦁 Maasai Mara - Famous for the Great Wildebeest Migration\n🐘 Amboseli - Best views of Mount Kilimanjaro\n🦒 Samburu - Unique wildlife species\n🌸 Lake Nakuru - Flamingo paradise\n\nWould you like detailed information about any of these?",
        )
        .with_entry(
            "best time to visit",
            "The best time for a Kenya safari:\n\n🌞 Dry Season (June-October): Best game viewing\n🌧️ Long Rains (March-May): Fewer crowds, lush landscapes\n🦓 Great Migration: July-October in Maasai Mara\n\nWhen are you planning to visit?",
        )
        .with_entry(
            "safari package prices",
            "Our safari packages start from:\n\n💰 Budget Safari: $150/day\n⭐ Mid-range Safari: $300/day\n🏆 Luxury Safari: $600/day\n\nPrices include accommodation, meals, and game drives. Would you like a custom quote?",
        )
        .with_entry(
            "what to pack",
            "Essential safari packing list:\n\n👕 Neutral colored clothing\n🧴 Sunscreen & insect repellent\n📸 Camera with extra batteries\n👟 Comfortable walking shoes\n🧢 Hat and sunglasses\n💊 Personal medications\n\nNeed a complete packing checklist?",
        )
    }
}

/// True when the input is longer than a chat message may be, counted in
/// grapheme clusters. Input is never shortened before matching.
pub fn exceeds_input_limit(input: &str) -> bool {
    input.graphemes(true).nth(MAX_CHAT_INPUT_GRAPHEMES).is_some()
}

pub fn match_intent<'a>(table: &'a ResponseTable, text: &str) -> IntentMatch<'a> {
    let lower = text.to_lowercase();

    let mut matched = IntentMatch {
        keyword: None,
        response: table.fallback.as_str(),
    };
    for entry in &table.entries {
        if lower.contains(entry.keyword.as_str()) {
            matched = IntentMatch {
                keyword: Some(entry.keyword.as_str()),
                response: entry.response.as_str(),
            };
        }
    }

    matched
}

pub fn match_response<'a>(table: &'a ResponseTable, text: &str) -> &'a str {
    match_intent(table, text).response
}
