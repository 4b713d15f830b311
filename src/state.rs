//! Shared application state: deck store, sessions, gateway client, prompts.
//!
//! The Rust rendition of the flow's cooperative single-tab model: sessions and
//! the deck slot are process-wide, guarded by `RwLock` (single writer, many
//! readers). Generation calls run outside any lock; sessions take the write
//! lock only to commit a result.

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, Limits, Prompts};
use crate::flashcards::FlashcardSession;
use crate::gateway::Gateway;
use crate::quiz::QuizSession;
use crate::store::DeckStore;
use crate::upload::UploadState;

pub struct AppState {
    pub deck: DeckStore,
    pub flashcards: RwLock<FlashcardSession>,
    pub quiz: RwLock<QuizSession>,
    pub upload: RwLock<UploadState>,
    pub gateway: Option<Gateway>,
    pub prompts: Prompts,
    pub limits: Limits,
}

impl AppState {
    /// Build state from env: load TOML config if provided, init the model
    /// client, start with empty sessions and an empty deck slot.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();

        let gateway = Gateway::from_env(&cfg.limits);
        if let Some(gw) = &gateway {
            info!(target: "flashdeck_backend", base_url = %gw.base_url, model = %gw.model, "model backend enabled");
        } else {
            info!(target: "flashdeck_backend", "model backend disabled (no OPENAI_API_KEY); generation will fail closed");
        }

        Self {
            deck: DeckStore::new(),
            flashcards: RwLock::new(FlashcardSession::default()),
            quiz: RwLock::new(QuizSession::default()),
            upload: RwLock::new(UploadState::default()),
            gateway,
            prompts: cfg.prompts,
            limits: cfg.limits,
        }
    }

    /// State with no model backend and default config, independent of env.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            deck: DeckStore::new(),
            flashcards: RwLock::new(FlashcardSession::default()),
            quiz: RwLock::new(QuizSession::default()),
            upload: RwLock::new(UploadState::default()),
            gateway: None,
            prompts: Prompts::default(),
            limits: Limits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Flashcard;
    use crate::protocol::{to_flashcard_view, to_quiz_state};

    #[tokio::test]
    async fn single_card_deck_flows_from_store_to_viewer() {
        let state = AppState::for_tests();
        state
            .deck
            .save(vec![Flashcard {
                term: "Mitosis".into(),
                definition: "Cell division producing two identical daughter cells".into(),
            }])
            .await;

        let deck = state.deck.load().await.unwrap();
        let mut session = state.flashcards.write().await;
        session.open(deck);
        let view = to_flashcard_view(&session).unwrap();
        assert_eq!((view.index, view.total), (0, 1));

        // Length 1: next wraps straight back to the same card.
        session.next();
        let view = to_flashcard_view(&session).unwrap();
        assert_eq!((view.index, view.total), (0, 1));
    }

    #[tokio::test]
    async fn quiz_generate_without_a_deck_stays_idle() {
        let state = AppState::for_tests();
        let has_cards = state.deck.has_cards().await;
        let mut quiz = state.quiz.write().await;
        assert!(quiz.begin_loading(has_cards).is_err());
        assert_eq!(to_quiz_state(&quiz).phase, "idle");
    }
}
