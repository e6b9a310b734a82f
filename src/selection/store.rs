//! Unified, order-preserving selection list
//!
//! Merges two input modalities into one list: clicking a transcript card
//! toggles the whole segment, dragging over text adds a highlight. Removing
//! something that is not there is a no-op.

use super::{card_selection_id, Selection, SelectionSource};
use crate::transcript::Segment;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct SelectionStore {
    selections: Vec<Selection>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a whole segment.
    ///
    /// Returns `true` if the segment is selected afterwards.
    pub fn add_card_selection(
        &mut self,
        segment_id: &str,
        text: &str,
        start_time: Option<&str>,
    ) -> bool {
        if self.is_card_selected(segment_id) {
            self.remove_card_selection(segment_id);
            debug!(segment_id, "Card deselected");
            return false;
        }

        self.selections.push(Selection {
            id: card_selection_id(segment_id),
            text: text.to_string(),
            source: SelectionSource::Card,
            segment_id: Some(segment_id.to_string()),
            start_time: start_time.map(str::to_string),
            is_quote: false,
        });
        debug!(segment_id, "Card selected");
        true
    }

    /// Add a free-text highlight.
    ///
    /// Text is stored exactly as given. If an identical highlight already
    /// exists it is kept and its id returned.
    pub fn add_text_selection(&mut self, text: &str, is_quote: bool) -> String {
        if let Some(existing) = self.find_text(text) {
            return existing.id.clone();
        }

        let id = format!("text-{}", Uuid::new_v4());
        self.selections.push(Selection {
            id: id.clone(),
            text: text.to_string(),
            source: SelectionSource::Text,
            segment_id: None,
            start_time: None,
            is_quote,
        });
        debug!(id = %id, words = super::count_words(text), "Text highlighted");
        id
    }

    pub fn remove_selection(&mut self, id: &str) {
        self.selections.retain(|s| s.id != id);
    }

    pub fn remove_text_selection(&mut self, text: &str) {
        self.selections
            .retain(|s| !(s.source == SelectionSource::Text && s.text == text));
    }

    pub fn remove_card_selection(&mut self, segment_id: &str) {
        self.selections
            .retain(|s| s.segment_id.as_deref() != Some(segment_id));
    }

    /// Flip the quote flag on the entry with this id.
    ///
    /// Card entries are addressed by their segment id. Returns the new flag,
    /// or `None` if no entry matched.
    pub fn toggle_quote(&mut self, id: &str) -> Option<bool> {
        let selection = self.selections.iter_mut().find(|s| s.id == id)?;
        selection.is_quote = !selection.is_quote;
        Some(selection.is_quote)
    }

    /// Flip the quote flag on the card selection for a segment
    pub fn toggle_card_quote(&mut self, segment_id: &str) -> Option<bool> {
        self.toggle_quote(&card_selection_id(segment_id))
    }

    /// Replace every card selection with one entry per segment.
    ///
    /// Highlights are kept and stay ahead of the new cards.
    pub fn select_all_cards(&mut self, segments: &[Segment]) {
        self.clear_card_selections();
        for segment in segments {
            if self.is_card_selected(&segment.id) {
                continue;
            }
            self.selections.push(Selection {
                id: card_selection_id(&segment.id),
                text: segment.text.clone(),
                source: SelectionSource::Card,
                segment_id: Some(segment.id.clone()),
                start_time: Some(segment.start_time.clone()),
                is_quote: false,
            });
        }
        debug!(count = segments.len(), "All cards selected");
    }

    pub fn clear_all(&mut self) {
        self.selections.clear();
    }

    pub fn clear_card_selections(&mut self) {
        self.selections.retain(|s| s.source != SelectionSource::Card);
    }

    pub fn clear_text_selections(&mut self) {
        self.selections.retain(|s| s.source != SelectionSource::Text);
    }

    pub fn is_card_selected(&self, segment_id: &str) -> bool {
        self.selections
            .iter()
            .any(|s| s.segment_id.as_deref() == Some(segment_id))
    }

    pub fn is_text_selected(&self, text: &str) -> bool {
        self.find_text(text).is_some()
    }

    /// Whether the entry with this id is marked as a quote
    pub fn is_quote(&self, id: &str) -> bool {
        self.get(id).is_some_and(|s| s.is_quote)
    }

    pub fn get(&self, id: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.id == id)
    }

    /// Selections in insertion order
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.selections.len()
    }

    pub fn card_selection_count(&self) -> usize {
        self.count_source(SelectionSource::Card)
    }

    pub fn text_selection_count(&self) -> usize {
        self.count_source(SelectionSource::Text)
    }

    pub fn quote_count(&self) -> usize {
        self.selections.iter().filter(|s| s.is_quote).count()
    }

    pub fn total_words(&self) -> usize {
        self.selections.iter().map(Selection::word_count).sum()
    }

    /// All selected text joined by blank lines
    pub fn combined_text(&self) -> String {
        self.selections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn count_source(&self, source: SelectionSource) -> usize {
        self.selections.iter().filter(|s| s.source == source).count()
    }

    fn find_text(&self, text: &str) -> Option<&Selection> {
        self.selections
            .iter()
            .find(|s| s.source == SelectionSource::Text && s.text == text)
    }
}
