//! Source-material selection
//!
//! Holds what the user has picked for the generated article: whole
//! transcript segments ("cards"), free-text highlights, and whole source
//! articles.

mod multi_select;
mod store;

pub use multi_select::MultiSelect;
pub use store::SelectionStore;

use serde::{Deserialize, Serialize};

/// Where a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSource {
    /// A whole transcript segment
    Card,
    /// A manual text highlight
    Text,
}

/// One unit of content chosen for the generated article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub id: String,
    pub text: String,
    pub source: SelectionSource,
    /// Originating segment, only for card selections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Render as a direct quotation instead of paraphrase
    pub is_quote: bool,
}

impl Selection {
    /// Number of whitespace-separated words in the text
    pub fn word_count(&self) -> usize {
        count_words(&self.text)
    }
}

/// Canonical id of a card selection for a segment.
///
/// Cards are keyed by their segment id. Highlight ids carry a `text-`
/// prefix, so the two never collide.
pub fn card_selection_id(segment_id: &str) -> String {
    segment_id.to_string()
}

/// Whitespace word count. Not locale-aware.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("hello world"), 2);
        assert_eq!(count_words("  spaced   out\n\ttext  "), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn test_selection_serializes_camel_case() {
        let selection = Selection {
            id: card_selection_id("s1"),
            text: "hello".to_string(),
            source: SelectionSource::Card,
            segment_id: Some("s1".to_string()),
            start_time: Some("00:05".to_string()),
            is_quote: false,
        };
        let json = serde_json::to_string(&selection).expect("Failed to serialize");
        assert!(json.contains("\"segmentId\":\"s1\""));
        assert!(json.contains("\"startTime\":\"00:05\""));
        assert!(json.contains("\"source\":\"card\""));
        assert!(json.contains("\"isQuote\":false"));
    }

    #[test]
    fn test_card_id_is_segment_id() {
        assert_eq!(card_selection_id("s1"), "s1");
    }
}
