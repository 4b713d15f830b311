//! Minimal client for the generation backend (OpenAI-compatible chat API).
//!
//! One call per application request: build the fixed instruction plus either a
//! PDF file part or the serialized deck, stream the SSE response into a
//! buffer, decode the buffer as a JSON array, and validate it against the
//! schema. Nothing is handed back to a caller until validation has passed.
//!
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents). We never log the API key.

use std::time::{Duration, Instant};

use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::config::{Limits, Prompts};
use crate::domain::{Flashcard, PdfDocument, Question};
use crate::error::GenerateError;
use crate::schema;
use crate::util::{strip_code_fences, trunc_for_log};

#[derive(Clone)]
pub struct Gateway {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  timeout_secs: u64,
}

impl Gateway {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(limits: &Limits) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    // The reqwest timeout covers the whole call, streamed body included.
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(limits.generation_timeout_secs))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model, timeout_secs: limits.generation_timeout_secs })
  }

  /// Convert one PDF document into a validated flashcard collection.
  #[instrument(level = "info", skip(self, prompts, doc), fields(model = %self.model, file = %doc.file_name, bytes = doc.bytes.len()))]
  pub async fn generate_flashcards(
    &self,
    prompts: &Prompts,
    doc: &PdfDocument,
  ) -> Result<Vec<Flashcard>, GenerateError> {
    let gen_id = Uuid::new_v4();
    let parts = vec![
      ContentPart::Text { text: prompts.flashcard_user.clone() },
      ContentPart::File {
        file: FilePart { filename: doc.file_name.clone(), file_data: doc.to_data_uri() },
      },
    ];

    let start = Instant::now();
    let value = self.stream_array(&prompts.flashcard_system, parts).await;
    let elapsed = start.elapsed();
    match &value {
      Ok(_) => info!(target: "generation", %gen_id, ?elapsed, "flashcard stream complete"),
      Err(e) => error!(target: "generation", %gen_id, ?elapsed, error = %e, "flashcard generation failed"),
    }

    let cards = schema::flashcards_from_value(&value?)?;
    info!(target: "generation", %gen_id, count = cards.len(), "flashcards validated");
    Ok(cards)
  }

  /// Produce one validated multiple-choice question per flashcard.
  /// The input deck must be non-empty (enforced by callers); the output count
  /// is expected but not guaranteed to equal the deck size.
  #[instrument(level = "info", skip(self, prompts, cards), fields(model = %self.model, deck = cards.len()))]
  pub async fn generate_questions(
    &self,
    prompts: &Prompts,
    cards: &[Flashcard],
  ) -> Result<Vec<Question>, GenerateError> {
    let gen_id = Uuid::new_v4();
    let deck_json =
      serde_json::to_string(cards).map_err(|e| GenerateError::Decode(e.to_string()))?;
    let parts = vec![
      ContentPart::Text { text: prompts.question_user.clone() },
      ContentPart::Text { text: deck_json },
    ];

    let start = Instant::now();
    let value = self.stream_array(&prompts.question_system, parts).await;
    let elapsed = start.elapsed();
    match &value {
      Ok(_) => info!(target: "generation", %gen_id, ?elapsed, "question stream complete"),
      Err(e) => error!(target: "generation", %gen_id, ?elapsed, error = %e, "question generation failed"),
    }

    let questions = schema::questions_from_value(&value?)?;
    if questions.len() != cards.len() {
      debug!(target: "generation", %gen_id, questions = questions.len(), deck = cards.len(), "question count differs from deck size");
    }
    info!(target: "generation", %gen_id, count = questions.len(), "questions validated");
    Ok(questions)
  }

  /// Streamed chat completion: buffer every SSE delta, then decode the full
  /// text as one JSON value. The array is only as good as its validation, so
  /// callers pass the result straight to the schema module.
  async fn stream_array(
    &self,
    system: &str,
    parts: Vec<ContentPart>,
  ) -> Result<Value, GenerateError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: MessageContent::Text(system.into()) },
        ChatMessageReq { role: "user".into(), content: MessageContent::Parts(parts) },
      ],
      temperature: 0.2,
      stream: true,
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "flashdeck-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| self.transport_error(e))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or(body);
      return Err(GenerateError::Api { status, message });
    }

    let mut acc = SseAccumulator::new();
    let mut body = res.bytes_stream();
    while let Some(chunk) = body.next().await {
      let chunk = chunk.map_err(|e| self.transport_error(e))?;
      acc.push(&chunk)?;
    }
    let text = acc.finish();
    debug!(target: "generation", size = text.len(), preview = %trunc_for_log(&text, 120), "stream buffered");

    serde_json::from_str::<Value>(strip_code_fences(&text))
      .map_err(|e| GenerateError::Decode(e.to_string()))
  }

  fn transport_error(&self, e: reqwest::Error) -> GenerateError {
    if e.is_timeout() {
      GenerateError::Timeout { secs: self.timeout_secs }
    } else {
      GenerateError::Transport(e.to_string())
    }
  }
}

/// Incremental SSE accumulator: feed raw body chunks, collect the
/// concatenated `choices[0].delta.content` text. Chunk boundaries need not
/// align with event boundaries; partial lines carry over between pushes.
struct SseAccumulator {
  pending: String,
  text: String,
}

impl SseAccumulator {
  fn new() -> Self {
    Self { pending: String::new(), text: String::new() }
  }

  fn push(&mut self, chunk: &[u8]) -> Result<(), GenerateError> {
    self.pending.push_str(&String::from_utf8_lossy(chunk));
    while let Some(pos) = self.pending.find('\n') {
      let line: String = self.pending.drain(..=pos).collect();
      let line = line.trim_end();
      let Some(data) = line.strip_prefix("data:") else { continue };
      let data = data.trim_start();
      if data.is_empty() || data == "[DONE]" {
        continue;
      }
      let event: ChatCompletionChunk = serde_json::from_str(data)
        .map_err(|e| GenerateError::Decode(format!("bad stream event: {e}")))?;
      if let Some(delta) = event.choices.first().and_then(|c| c.delta.content.as_deref()) {
        self.text.push_str(delta);
      }
    }
    Ok(())
  }

  fn finish(self) -> String {
    self.text
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  stream: bool,
}

#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
  Text(String),
  Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
  Text { text: String },
  File { file: FilePart },
}

#[derive(Serialize)]
struct FilePart {
  filename: String,
  file_data: String,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
  choices: Vec<ChunkChoice>,
}
#[derive(Deserialize)]
struct ChunkChoice {
  delta: ChunkDelta,
}
#[derive(Deserialize)]
struct ChunkDelta {
  #[serde(default)]
  content: Option<String>,
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn event(content: &str) -> String {
    format!(
      "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}}}}]}}\n\n",
      serde_json::to_string(content).unwrap()
    )
  }

  #[test]
  fn accumulates_deltas_across_events() {
    let mut acc = SseAccumulator::new();
    acc.push(event("[{\"term\":").as_bytes()).unwrap();
    acc.push(event("\"a\",\"definition\":\"b\"}]").as_bytes()).unwrap();
    acc.push(b"data: [DONE]\n\n").unwrap();
    assert_eq!(acc.finish(), "[{\"term\":\"a\",\"definition\":\"b\"}]");
  }

  #[test]
  fn handles_chunks_split_mid_line() {
    let ev = event("hello");
    let (head, tail) = ev.split_at(10);
    let mut acc = SseAccumulator::new();
    acc.push(head.as_bytes()).unwrap();
    acc.push(tail.as_bytes()).unwrap();
    assert_eq!(acc.finish(), "hello");
  }

  #[test]
  fn tolerates_crlf_and_empty_deltas() {
    let mut acc = SseAccumulator::new();
    acc.push(b"data: {\"choices\":[{\"delta\":{}}]}\r\n").unwrap();
    acc.push(b"\r\n").unwrap();
    acc.push(event("x").replace('\n', "\r\n").as_bytes()).unwrap();
    assert_eq!(acc.finish(), "x");
  }

  #[test]
  fn malformed_event_is_a_decode_error() {
    let mut acc = SseAccumulator::new();
    let err = acc.push(b"data: {not json}\n").unwrap_err();
    assert!(matches!(err, GenerateError::Decode(_)));
  }

  #[test]
  fn extracts_api_error_message() {
    let body = "{\"error\":{\"message\":\"model overloaded\",\"type\":\"server_error\"}}";
    assert_eq!(extract_api_error(body).as_deref(), Some("model overloaded"));
    assert!(extract_api_error("plain text").is_none());
  }
}
