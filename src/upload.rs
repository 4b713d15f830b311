//! Upload orchestration: media-type gate, payload decoding, coarse progress,
//! single-flight, and the hand-off to the generation gateway.
//!
//! Input rejections happen before any request is sent. A failed generation
//! resets progress and leaves the previously stored deck untouched; only a
//! validated result replaces it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, instrument};

use crate::config::Limits;
use crate::domain::PdfDocument;
use crate::error::{ApiError, GenerateError, InputError, StateError};
use crate::state::AppState;
use crate::util::parse_data_uri;

/// Fixed-step progress indicator for the upload flow. Not a byte-level
/// measurement: the steps mirror read / request-sent / complete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadProgress {
  #[default]
  Idle,
  Reading,
  Sent,
  Complete,
}

impl UploadProgress {
  pub fn percent(self) -> u8 {
    match self {
      UploadProgress::Idle => 0,
      UploadProgress::Reading => 30,
      UploadProgress::Sent => 60,
      UploadProgress::Complete => 100,
    }
  }
}

/// Mutable orchestrator state, guarded by the AppState lock.
#[derive(Default)]
pub struct UploadState {
  pub in_flight: bool,
  pub progress: UploadProgress,
}

/// Decode and gate an upload payload before any network call. `data` must be
/// a base64 `data:` URI with media type exactly "application/pdf", and the
/// decoded body must fit the configured limit.
pub fn decode_payload(file_name: &str, data: &str, limits: &Limits) -> Result<PdfDocument, InputError> {
  if data.trim().is_empty() {
    return Err(InputError::MissingDocument);
  }
  let (media_type, payload) = parse_data_uri(data)
    .ok_or_else(|| InputError::BadEncoding("not a base64 data URI".into()))?;
  if media_type != "application/pdf" {
    return Err(InputError::NotAPdf { media_type: media_type.into() });
  }
  let bytes = STANDARD.decode(payload).map_err(|e| InputError::BadEncoding(e.to_string()))?;
  if bytes.len() > limits.max_upload_bytes {
    return Err(InputError::TooLarge { size: bytes.len(), limit: limits.max_upload_bytes });
  }
  Ok(PdfDocument { file_name: file_name.to_string(), bytes })
}

/// Drive one upload end to end. Progress and the single-flight flag live in
/// `state.upload`; the flashcard session reopens on the fresh deck on success.
#[instrument(level = "info", skip(state, data), fields(file = %file_name, data_len = data.len()))]
pub async fn run_upload(state: &AppState, file_name: &str, data: &str) -> Result<usize, ApiError> {
  {
    let mut upload = state.upload.write().await;
    if upload.in_flight {
      return Err(StateError::Busy.into());
    }
    upload.in_flight = true;
    upload.progress = UploadProgress::Reading;
  }

  let result = drive(state, file_name, data).await;

  {
    let mut upload = state.upload.write().await;
    upload.in_flight = false;
    upload.progress = UploadProgress::Idle;
  }
  result
}

async fn drive(state: &AppState, file_name: &str, data: &str) -> Result<usize, ApiError> {
  let doc = decode_payload(file_name, data, &state.limits)?;

  let Some(gateway) = &state.gateway else {
    return Err(GenerateError::Unconfigured.into());
  };
  state.upload.write().await.progress = UploadProgress::Sent;

  let cards = gateway.generate_flashcards(&state.prompts, &doc).await?;
  let count = cards.len();

  state.deck.save(cards.clone()).await;
  state.flashcards.write().await.open(cards);
  state.upload.write().await.progress = UploadProgress::Complete;
  info!(target: "flashdeck_backend", count, "upload complete, deck replaced");
  Ok(count)
}
