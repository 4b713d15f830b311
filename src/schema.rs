//! Canonical shapes for model output, and the validation gate between untyped
//! JSON and internal typed data.
//!
//! The gateway hands every fully-buffered model response through these
//! functions before anything reaches a session. Validation is fail-closed: one
//! bad element rejects the whole collection, and nothing partial is exposed.
//!
//! Membership of `correctAnswer` in `options` is deliberately NOT checked
//! here. The generator is instructed to uphold it; the schema contract only
//! covers field presence, JSON types, and the four-option arity.

use serde_json::Value;
use thiserror::Error;

use crate::domain::{Flashcard, Question};

/// Field-level validation failure for one generation result.
#[derive(Debug, Error)]
#[error("schema validation failed: {}", issues.join("; "))]
pub struct SchemaError {
  pub issues: Vec<String>,
}

/// Validate a single flashcard candidate: `term` and `definition` must both be
/// present strings.
pub fn flashcard_from_value(v: &Value) -> Result<Flashcard, SchemaError> {
  let mut issues = Vec::new();
  match flashcard_at(v, "flashcard", &mut issues) {
    Some(card) if issues.is_empty() => Ok(card),
    _ => Err(SchemaError { issues }),
  }
}

/// Validate a whole flashcard generation result. The empty array is valid.
pub fn flashcards_from_value(v: &Value) -> Result<Vec<Flashcard>, SchemaError> {
  let Some(items) = v.as_array() else {
    return Err(SchemaError { issues: vec!["expected a JSON array of flashcards".into()] });
  };
  let mut issues = Vec::new();
  let mut cards = Vec::with_capacity(items.len());
  for (i, item) in items.iter().enumerate() {
    if let Some(card) = flashcard_at(item, &format!("[{i}]"), &mut issues) {
      cards.push(card);
    }
  }
  if issues.is_empty() { Ok(cards) } else { Err(SchemaError { issues }) }
}

/// Validate a single question candidate: `question` and `correctAnswer` must
/// be strings, `options` an array of exactly 4 strings.
pub fn question_from_value(v: &Value) -> Result<Question, SchemaError> {
  let mut issues = Vec::new();
  match question_at(v, "question", &mut issues) {
    Some(q) if issues.is_empty() => Ok(q),
    _ => Err(SchemaError { issues }),
  }
}

/// Validate a whole question generation result. A quiz needs at least one
/// question, so the empty array is rejected here.
pub fn questions_from_value(v: &Value) -> Result<Vec<Question>, SchemaError> {
  let Some(items) = v.as_array() else {
    return Err(SchemaError { issues: vec!["expected a JSON array of questions".into()] });
  };
  if items.is_empty() {
    return Err(SchemaError { issues: vec!["expected at least one question".into()] });
  }
  let mut issues = Vec::new();
  let mut questions = Vec::with_capacity(items.len());
  for (i, item) in items.iter().enumerate() {
    if let Some(q) = question_at(item, &format!("[{i}]"), &mut issues) {
      questions.push(q);
    }
  }
  if issues.is_empty() { Ok(questions) } else { Err(SchemaError { issues }) }
}

fn string_field(v: &Value, path: &str, field: &str, issues: &mut Vec<String>) -> Option<String> {
  match v.get(field) {
    Some(Value::String(s)) => Some(s.clone()),
    Some(_) => {
      issues.push(format!("{path}.{field}: expected a string"));
      None
    }
    None => {
      issues.push(format!("{path}.{field}: missing"));
      None
    }
  }
}

fn flashcard_at(v: &Value, path: &str, issues: &mut Vec<String>) -> Option<Flashcard> {
  if !v.is_object() {
    issues.push(format!("{path}: expected an object"));
    return None;
  }
  let term = string_field(v, path, "term", issues);
  let definition = string_field(v, path, "definition", issues);
  match (term, definition) {
    (Some(term), Some(definition)) => Some(Flashcard { term, definition }),
    _ => None,
  }
}

fn question_at(v: &Value, path: &str, issues: &mut Vec<String>) -> Option<Question> {
  if !v.is_object() {
    issues.push(format!("{path}: expected an object"));
    return None;
  }
  let question = string_field(v, path, "question", issues);
  let correct_answer = string_field(v, path, "correctAnswer", issues);
  let options = match v.get("options") {
    Some(Value::Array(xs)) if xs.len() == 4 => {
      let mut opts = Vec::with_capacity(4);
      for (i, x) in xs.iter().enumerate() {
        match x {
          Value::String(s) => opts.push(s.clone()),
          _ => issues.push(format!("{path}.options[{i}]: expected a string")),
        }
      }
      (opts.len() == 4).then_some(opts)
    }
    Some(Value::Array(xs)) => {
      issues.push(format!("{path}.options: expected exactly 4 options, got {}", xs.len()));
      None
    }
    Some(_) => {
      issues.push(format!("{path}.options: expected an array"));
      None
    }
    None => {
      issues.push(format!("{path}.options: missing"));
      None
    }
  };
  match (question, options, correct_answer) {
    (Some(question), Some(options), Some(correct_answer)) => {
      Some(Question { question, options, correct_answer })
    }
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn accepts_well_formed_flashcards() {
    let v = json!([
      { "term": "Mitosis", "definition": "Cell division producing two identical daughter cells" },
      { "term": "Meiosis", "definition": "Cell division producing four haploid cells" },
    ]);
    let cards = flashcards_from_value(&v).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].term, "Mitosis");
  }

  #[test]
  fn empty_flashcard_array_is_valid() {
    assert!(flashcards_from_value(&json!([])).unwrap().is_empty());
  }

  #[test]
  fn rejects_flashcard_missing_definition() {
    let err = flashcard_from_value(&json!({ "term": "Mitosis" })).unwrap_err();
    assert_eq!(err.issues, vec!["flashcard.definition: missing"]);
  }

  #[test]
  fn one_bad_element_rejects_the_whole_collection() {
    let v = json!([
      { "term": "ok", "definition": "ok" },
      { "term": "missing definition" },
    ]);
    let err = flashcards_from_value(&v).unwrap_err();
    assert!(err.issues.iter().any(|m| m.contains("[1].definition")));
  }

  #[test]
  fn rejects_non_array_flashcard_result() {
    let err = flashcards_from_value(&json!({ "term": "x", "definition": "y" })).unwrap_err();
    assert!(err.to_string().contains("expected a JSON array"));
  }

  #[test]
  fn rejects_question_with_wrong_option_count() {
    for count in [3usize, 5] {
      let opts: Vec<String> = (0..count).map(|i| format!("opt {i}")).collect();
      let v = json!({ "question": "q?", "options": opts, "correctAnswer": "opt 0" });
      let err = question_from_value(&v).unwrap_err();
      assert!(err.issues[0].contains("exactly 4"), "count {count}: {:?}", err.issues);
    }
  }

  #[test]
  fn rejects_non_string_option() {
    let v = json!({ "question": "q?", "options": ["a", "b", 3, "d"], "correctAnswer": "a" });
    let err = question_from_value(&v).unwrap_err();
    assert!(err.issues[0].contains("options[2]"));
  }

  #[test]
  fn accepts_question_whose_answer_is_not_among_options() {
    // Documented gap: membership is a generator-side invariant, not a schema rule.
    let v = json!({
      "question": "q?",
      "options": ["a", "b", "c", "d"],
      "correctAnswer": "e",
    });
    let q = question_from_value(&v).unwrap();
    assert_eq!(q.correct_answer, "e");
  }

  #[test]
  fn rejects_empty_question_array() {
    let err = questions_from_value(&json!([])).unwrap_err();
    assert!(err.to_string().contains("at least one question"));
  }
}
