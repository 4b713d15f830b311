//! HTTP endpoint handlers. These are thin wrappers that forward to sessions,
//! the upload orchestrator, and the generation gateway, and apply the error
//! collapse policy at the boundary: input/state rejections keep their specific
//! message, generation failures are logged in detail and surfaced as one
//! generic line.

use std::sync::Arc;

use axum::{
  extract::State,
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::domain::{Flashcard, PdfDocument, Question};
use crate::error::{
  ApiError, GenerateError, InputError, StateError, GENERIC_QUIZ_ERROR, GENERIC_UPLOAD_ERROR,
};
use crate::flashcards::FlashcardSession;
use crate::protocol::*;
use crate::state::AppState;
use crate::upload::{decode_payload, run_upload};

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

//
// Generation endpoints (wire-compatible with the original flow)
//

#[instrument(level = "info", skip(state, body), fields(files = body.files.len()))]
pub async fn http_generate_flashcards(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateFlashcardsIn>,
) -> Response {
  let Some(file) = body.files.first() else {
    return input_rejection(&InputError::MissingDocument);
  };
  let file_name = file.file_name.clone().unwrap_or_else(|| "upload.pdf".into());
  let doc = match decode_payload(&file_name, &file.data, &state.limits) {
    Ok(doc) => doc,
    Err(e) => return input_rejection(&e),
  };

  match generate_cards_via(&state, &doc).await {
    Ok(cards) => {
      info!(target: "generation", count = cards.len(), "HTTP generateFlashcards served");
      streamed_array(&cards)
    }
    Err(e) => generation_rejection(e),
  }
}

#[instrument(level = "info", skip(state, body), fields(deck = body.flashcards.len()))]
pub async fn http_generate_test(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateTestIn>,
) -> Response {
  if body.flashcards.is_empty() {
    return input_rejection(&InputError::EmptyFlashcards);
  }
  match generate_questions_via(&state, &body.flashcards).await {
    Ok(questions) => {
      info!(target: "generation", count = questions.len(), "HTTP generateTest served");
      streamed_array(&questions)
    }
    Err(e) => generation_rejection(e),
  }
}

//
// Upload orchestration
//

#[instrument(level = "info", skip(state, body), fields(file = %body.file_name, data_len = body.data.len()))]
pub async fn http_upload(
  State(state): State<Arc<AppState>>,
  Json(body): Json<UploadIn>,
) -> Response {
  match run_upload(&state, &body.file_name, &body.data).await {
    Ok(cards) => {
      info!(target: "flashdeck_backend", cards, "HTTP upload complete");
      Json(UploadOut { cards }).into_response()
    }
    Err(e) => collapsed_rejection(e, GENERIC_UPLOAD_ERROR),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_upload_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let upload = state.upload.read().await;
  Json(UploadProgressOut { percent: upload.progress.percent(), in_flight: upload.in_flight })
}

//
// Flashcard session
//

#[instrument(level = "info", skip(state))]
pub async fn http_flashcards_open(State(state): State<Arc<AppState>>) -> Response {
  let deck = state.deck.load().await.unwrap_or_default();
  let mut session = state.flashcards.write().await;
  session.open(deck);
  info!(target: "flashdeck_backend", cards = session.len(), "flashcard session opened");
  flashcard_view(&session)
}

#[instrument(level = "info", skip(state))]
pub async fn http_flashcards_current(State(state): State<Arc<AppState>>) -> Response {
  flashcard_view(&*state.flashcards.read().await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_flashcards_next(State(state): State<Arc<AppState>>) -> Response {
  let mut session = state.flashcards.write().await;
  session.next();
  flashcard_view(&session)
}

#[instrument(level = "info", skip(state))]
pub async fn http_flashcards_prev(State(state): State<Arc<AppState>>) -> Response {
  let mut session = state.flashcards.write().await;
  session.prev();
  flashcard_view(&session)
}

#[instrument(level = "info", skip(state))]
pub async fn http_flashcards_flip(State(state): State<Arc<AppState>>) -> Response {
  let mut session = state.flashcards.write().await;
  match session.flip() {
    Ok(()) => flashcard_view(&session),
    Err(e) => state_rejection(&e),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_flashcards_quiz(State(state): State<Arc<AppState>>) -> Response {
  let session = state.flashcards.read().await;
  match session.turn_into_quiz() {
    Ok(handoff) => {
      info!(target: "flashdeck_backend", "flashcards handed off to quiz");
      Json(to_handoff_out(handoff)).into_response()
    }
    Err(e) => state_rejection(&e),
  }
}

//
// Quiz session
//

#[instrument(level = "info", skip(state, body), fields(auto_generate = body.auto_generate))]
pub async fn http_quiz_open(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuizOpenIn>,
) -> Response {
  if body.auto_generate {
    if let Err(e) = drive_quiz_generation(&state).await {
      return collapsed_rejection(e, GENERIC_QUIZ_ERROR);
    }
  }
  quiz_state(&state).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_generate(State(state): State<Arc<AppState>>) -> Response {
  match drive_quiz_generation(&state).await {
    Ok(()) => quiz_state(&state).await,
    Err(e) => collapsed_rejection(e, GENERIC_QUIZ_ERROR),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_state(State(state): State<Arc<AppState>>) -> Response {
  quiz_state(&state).await
}

#[instrument(level = "info", skip(state, body), fields(choice_len = body.choice.len()))]
pub async fn http_quiz_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuizAnswerIn>,
) -> Response {
  let mut quiz = state.quiz.write().await;
  match quiz.answer(&body.choice) {
    Ok(slot) => {
      let correct = slot.is_correct;
      info!(target: "flashdeck_backend", index = quiz.cursor(), correct = correct, "answer recorded");
      Json(to_quiz_state(&quiz)).into_response()
    }
    Err(e) => state_rejection(&e),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_next(State(state): State<Arc<AppState>>) -> Response {
  let mut quiz = state.quiz.write().await;
  match quiz.next() {
    Ok(()) => Json(to_quiz_state(&quiz)).into_response(),
    Err(e) => state_rejection(&e),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_quiz_skip(State(state): State<Arc<AppState>>) -> Response {
  let mut quiz = state.quiz.write().await;
  match quiz.skip() {
    Ok(()) => Json(to_quiz_state(&quiz)).into_response(),
    Err(e) => state_rejection(&e),
  }
}

/// Retake re-invokes the full generate transition, discarding answers and score.
#[instrument(level = "info", skip(state))]
pub async fn http_quiz_retake(State(state): State<Arc<AppState>>) -> Response {
  match drive_quiz_generation(&state).await {
    Ok(()) => quiz_state(&state).await,
    Err(e) => collapsed_rejection(e, GENERIC_QUIZ_ERROR),
  }
}

//
// Shared drivers & boundary helpers
//

async fn generate_cards_via(
  state: &AppState,
  doc: &PdfDocument,
) -> Result<Vec<Flashcard>, GenerateError> {
  match &state.gateway {
    Some(gw) => gw.generate_flashcards(&state.prompts, doc).await,
    None => Err(GenerateError::Unconfigured),
  }
}

async fn generate_questions_via(
  state: &AppState,
  cards: &[Flashcard],
) -> Result<Vec<Question>, GenerateError> {
  match &state.gateway {
    Some(gw) => gw.generate_questions(&state.prompts, cards).await,
    None => Err(GenerateError::Unconfigured),
  }
}

/// Full generate transition: Idle/Active -> Loading -> Active on success,
/// back to Idle on failure. The gateway call runs outside the session lock.
async fn drive_quiz_generation(state: &AppState) -> Result<(), ApiError> {
  let deck = state.deck.load().await.unwrap_or_default();
  state.quiz.write().await.begin_loading(!deck.is_empty())?;

  let result = generate_questions_via(state, &deck).await;

  let mut quiz = state.quiz.write().await;
  match result {
    Ok(questions) => {
      quiz.succeed_loading(questions);
      Ok(())
    }
    Err(e) => {
      quiz.fail_loading();
      Err(e.into())
    }
  }
}

async fn quiz_state(state: &AppState) -> Response {
  Json(to_quiz_state(&*state.quiz.read().await)).into_response()
}

fn flashcard_view(session: &FlashcardSession) -> Response {
  match to_flashcard_view(session) {
    Ok(view) => Json(view).into_response(),
    Err(e) => state_rejection(&e),
  }
}

/// The original wire contract: HTTP 200, Content-Type text/plain, body is the
/// textual JSON array (already fully buffered and validated).
fn streamed_array<T: Serialize>(items: &[T]) -> Response {
  match serde_json::to_string(items) {
    Ok(body) => ([(header::CONTENT_TYPE, "text/plain")], body).into_response(),
    Err(e) => {
      error!(target: "flashdeck_backend", error = %e, "response serialization failed");
      (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { error: e.to_string() })).into_response()
    }
  }
}

fn input_rejection(e: &InputError) -> Response {
  (StatusCode::BAD_REQUEST, Json(ErrorOut { error: e.to_string() })).into_response()
}

fn state_rejection(e: &StateError) -> Response {
  let status = match e {
    StateError::EmptyDeck => StatusCode::NOT_FOUND,
    StateError::Busy => StatusCode::CONFLICT,
    _ => StatusCode::BAD_REQUEST,
  };
  (status, Json(ErrorOut { error: e.to_string() })).into_response()
}

/// Raw endpoint surface: the error body carries the real message (the client
/// applies its own generic copy), mirroring the original 500 {error} shape.
fn generation_rejection(e: GenerateError) -> Response {
  error!(target: "generation", error = %e, "generation failed");
  (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { error: e.to_string() })).into_response()
}

/// Session surface: the detail goes to the logs, the user sees one generic line.
fn collapsed_rejection(e: ApiError, generic: &'static str) -> Response {
  match e {
    ApiError::Input(e) => input_rejection(&e),
    ApiError::State(e) => state_rejection(&e),
    ApiError::Generate(e) => {
      error!(target: "generation", error = %e, "generation failed");
      (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { error: generic.into() })).into_response()
    }
  }
}
