//! Process-wide deck store: the single slot holding the most recent
//! successfully generated flashcard collection.
//!
//! Sessions load from here when they open, and only a successful upload (or a
//! regeneration) writes it. Single writer by construction; readers clone the
//! deck. A failed generation never touches the slot.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::domain::Flashcard;

/// Name the deck slot is logged under; kept from the original wire contract.
pub const DECK_KEY: &str = "flashcards";

#[derive(Clone, Default)]
pub struct DeckStore {
    slot: Arc<RwLock<Option<Vec<Flashcard>>>>,
}

impl DeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored deck. Only called on generation success.
    #[instrument(level = "debug", skip(self, cards), fields(count = cards.len()))]
    pub async fn save(&self, cards: Vec<Flashcard>) {
        let count = cards.len();
        *self.slot.write().await = Some(cards);
        info!(target: "flashdeck_backend", key = DECK_KEY, count, "deck saved");
    }

    /// Current deck, if one was ever saved. An empty deck loads as `Some(vec![])`.
    pub async fn load(&self) -> Option<Vec<Flashcard>> {
        self.slot.read().await.clone()
    }

    /// True when a deck is present and non-empty.
    pub async fn has_cards(&self) -> bool {
        self.slot.read().await.as_ref().map_or(false, |cards| !cards.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(terms: &[&str]) -> Vec<Flashcard> {
        terms
            .iter()
            .map(|t| Flashcard { term: t.to_string(), definition: format!("def of {t}") })
            .collect()
    }

    #[test]
    fn starts_empty() {
        tokio_test::block_on(async {
            let store = DeckStore::new();
            assert!(store.load().await.is_none());
            assert!(!store.has_cards().await);
        });
    }

    #[test]
    fn save_replaces_the_previous_deck() {
        tokio_test::block_on(async {
            let store = DeckStore::new();
            store.save(deck(&["a", "b"])).await;
            store.save(deck(&["c"])).await;
            let cards = store.load().await.unwrap();
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].term, "c");
        });
    }

    #[test]
    fn empty_deck_is_present_but_has_no_cards() {
        tokio_test::block_on(async {
            let store = DeckStore::new();
            store.save(Vec::new()).await;
            assert!(store.load().await.is_some());
            assert!(!store.has_cards().await);
        });
    }
}
