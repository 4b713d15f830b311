//! Domain models used by the backend: flashcards, quiz questions, answer slots,
//! and the decoded upload payload.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// A term/definition pair produced from a source document.
/// Decks are immutable once generated; a new upload replaces the whole deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
  pub term: String,
  pub definition: String,
}

/// A four-option multiple-choice item derived from a flashcard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub question: String,
  pub options: Vec<String>,
  #[serde(rename = "correctAnswer")]
  pub correct_answer: String,
}

/// Per-question answer record. `selected_answer` stays `None` until the user
/// commits a choice; once set it never changes.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSlot {
  pub selected_answer: Option<String>,
  pub is_correct: bool,
}

impl AnswerSlot {
  pub fn is_answered(&self) -> bool {
    self.selected_answer.is_some()
  }
}

/// A decoded PDF upload, ready to hand to the generation gateway.
#[derive(Clone, Debug)]
pub struct PdfDocument {
  pub file_name: String,
  pub bytes: Vec<u8>,
}

impl PdfDocument {
  /// Re-encode as the `data:` URI the model API expects for file parts.
  pub fn to_data_uri(&self) -> String {
    format!("data:application/pdf;base64,{}", STANDARD.encode(&self.bytes))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn answer_slot_starts_unanswered() {
    let slot = AnswerSlot::default();
    assert!(!slot.is_answered());
    assert!(!slot.is_correct);
  }

  #[test]
  fn pdf_document_data_uri_round_trips() {
    let doc = PdfDocument { file_name: "notes.pdf".into(), bytes: b"%PDF-1.4".to_vec() };
    let uri = doc.to_data_uri();
    assert!(uri.starts_with("data:application/pdf;base64,"));
    let payload = uri.strip_prefix("data:application/pdf;base64,").unwrap();
    assert_eq!(STANDARD.decode(payload).unwrap(), doc.bytes);
  }
}
