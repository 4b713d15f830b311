//! Flashcard viewer session: one card at a time, wrap-around navigation, and a
//! reveal toggle for the definition side.

use crate::domain::Flashcard;
use crate::error::StateError;

/// Reveal state is cleared whenever the cursor moves: a fresh card always
/// starts term-side up. The alternative (keeping the flip across navigation)
/// was rejected; see DESIGN.md.
const RESET_REVEAL_ON_NAVIGATE: bool = true;

#[derive(Default)]
pub struct FlashcardSession {
  cards: Vec<Flashcard>,
  cursor: usize,
  revealed: bool,
}

impl FlashcardSession {
  /// (Re)open the session over a deck. Resets cursor and reveal state.
  pub fn open(&mut self, cards: Vec<Flashcard>) {
    *self = Self { cards, cursor: 0, revealed: false };
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn revealed(&self) -> bool {
    self.revealed
  }

  /// Card under the cursor, or `EmptyDeck` when nothing is loaded.
  pub fn current(&self) -> Result<&Flashcard, StateError> {
    self.cards.get(self.cursor).ok_or(StateError::EmptyDeck)
  }

  /// Advance one card, wrapping at the end. No-op on decks of length <= 1.
  pub fn next(&mut self) {
    self.step(1);
  }

  /// Step back one card, wrapping at the start. No-op on decks of length <= 1.
  pub fn prev(&mut self) {
    self.step(self.cards.len().wrapping_sub(1));
  }

  fn step(&mut self, delta: usize) {
    if self.cards.len() <= 1 {
      return;
    }
    self.cursor = (self.cursor + delta) % self.cards.len();
    if RESET_REVEAL_ON_NAVIGATE {
      self.revealed = false;
    }
  }

  /// Toggle the definition reveal for the current card.
  pub fn flip(&mut self) -> Result<(), StateError> {
    if self.cards.is_empty() {
      return Err(StateError::EmptyDeck);
    }
    self.revealed = !self.revealed;
    Ok(())
  }

  /// Hand-off command for the quiz screen. Only meaningful on a non-empty deck.
  pub fn turn_into_quiz(&self) -> Result<QuizHandoff, StateError> {
    if self.cards.is_empty() {
      return Err(StateError::EmptyDeck);
    }
    Ok(QuizHandoff { redirect: "/test".into(), auto_generate: true })
  }
}

/// Explicit navigation command replacing a cross-screen one-shot flag: the
/// quiz session is opened with `auto_generate` passed as a request parameter,
/// so nothing stale can leak into an unrelated session.
#[derive(Debug, PartialEq, Eq)]
pub struct QuizHandoff {
  pub redirect: String,
  pub auto_generate: bool,
}
