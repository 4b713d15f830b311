//! Error taxonomy for the upload/generation/session flow.
//!
//! Three classes with different boundary behavior:
//! - [`InputError`]: caught before any network call; shown to the user verbatim.
//! - [`GenerateError`]: transport/model/decode/validation/timeout failures
//!   behind the gateway; logged in detail, collapsed to one generic message at
//!   the session boundary.
//! - [`StateError`]: illegal session transition; shown to the user verbatim.
//!
//! No failure is fatal: every error path returns the owning session to its
//! prior stable state.

use thiserror::Error;

use crate::schema::SchemaError;

/// Generic user-facing text for a failed flashcard generation.
pub const GENERIC_UPLOAD_ERROR: &str = "Failed to process PDF. Please try again.";
/// Generic user-facing text for a failed quiz generation.
pub const GENERIC_QUIZ_ERROR: &str = "Failed to generate test. Please try again.";

/// Rejected input, detected before any request is sent.
#[derive(Debug, Error)]
pub enum InputError {
  #[error("Please select a valid PDF file")]
  NotAPdf { media_type: String },
  #[error("Please select a PDF file first")]
  MissingDocument,
  #[error("PDF is larger than the {limit} byte upload limit")]
  TooLarge { size: usize, limit: usize },
  #[error("could not decode the uploaded document: {0}")]
  BadEncoding(String),
  #[error("flashcards must be a non-empty collection")]
  EmptyFlashcards,
}

/// A generation call failed. All variants collapse to one generic message at
/// the session boundary; the detail only reaches the logs.
#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("model request failed: {0}")]
  Transport(String),
  #[error("model API returned HTTP {status}: {message}")]
  Api { status: u16, message: String },
  #[error("model output is not valid JSON: {0}")]
  Decode(String),
  #[error(transparent)]
  Validation(#[from] SchemaError),
  #[error("generation timed out after {secs}s")]
  Timeout { secs: u64 },
  #[error("no model backend configured (set OPENAI_API_KEY)")]
  Unconfigured,
}

/// Illegal session transition.
#[derive(Debug, Error)]
pub enum StateError {
  #[error("No flashcards found. Please upload a PDF first.")]
  EmptyDeck,
  #[error("No flashcards found. Please create some flashcards first.")]
  NoDeckForQuiz,
  #[error("a generation request is already in flight")]
  Busy,
  #[error("the quiz has no questions loaded")]
  NoQuestions,
  #[error("answer the current question before moving on")]
  Unanswered,
}

/// Route-level wrapper keeping the class visible, so the HTTP boundary can
/// apply the collapse policy per class.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Input(#[from] InputError),
  #[error(transparent)]
  State(#[from] StateError),
  #[error(transparent)]
  Generate(#[from] GenerateError),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn input_error_messages_are_user_facing() {
    let e = InputError::NotAPdf { media_type: "image/png".into() };
    assert_eq!(e.to_string(), "Please select a valid PDF file");
  }

  #[test]
  fn timeout_message_names_the_ceiling() {
    let e = GenerateError::Timeout { secs: 60 };
    assert!(e.to_string().contains("60s"));
  }

  #[test]
  fn validation_error_passes_through_schema_issues() {
    let schema_err = SchemaError { issues: vec!["[0].term: missing".into()] };
    let e = GenerateError::from(schema_err);
    assert!(e.to_string().contains("[0].term"));
  }
}
