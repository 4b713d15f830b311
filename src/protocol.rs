//! Public protocol structs for the HTTP endpoints (serde ready), plus the
//! conversions from internal session state to public DTOs.
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::Flashcard;
use crate::error::StateError;
use crate::flashcards::{FlashcardSession, QuizHandoff};
use crate::quiz::{QuizPhase, QuizSession};

//
// Generation endpoints (wire-compatible with the original flow)
//

#[derive(Debug, Deserialize)]
pub struct GenerateFlashcardsIn {
    pub files: Vec<FilePayload>,
}

#[derive(Debug, Deserialize)]
pub struct FilePayload {
    pub data: String,
    #[serde(default, rename = "fileName")]
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateTestIn {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

//
// Upload orchestration
//

#[derive(Debug, Deserialize)]
pub struct UploadIn {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub data: String,
}

#[derive(Serialize)]
pub struct UploadOut {
    pub cards: usize,
}

#[derive(Serialize)]
pub struct UploadProgressOut {
    pub percent: u8,
    #[serde(rename = "inFlight")]
    pub in_flight: bool,
}

//
// Flashcard session
//

#[derive(Serialize)]
pub struct FlashcardViewOut {
    pub term: String,
    /// Only present while the card is revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    pub index: usize,
    pub total: usize,
    pub revealed: bool,
}

#[derive(Serialize)]
pub struct QuizHandoffOut {
    pub redirect: String,
    #[serde(rename = "autoGenerate")]
    pub auto_generate: bool,
}

//
// Quiz session
//

#[derive(Debug, Default, Deserialize)]
pub struct QuizOpenIn {
    #[serde(default, rename = "autoGenerate")]
    pub auto_generate: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuizAnswerIn {
    pub choice: String,
}

#[derive(Serialize)]
pub struct QuizStateOut {
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuizQuestionOut>,
    pub index: usize,
    pub total: usize,
    pub score: u32,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<QuizSummaryOut>,
}

#[derive(Serialize)]
pub struct QuizQuestionOut {
    pub question: String,
    pub options: Vec<String>,
    pub answered: bool,
    #[serde(rename = "selectedAnswer", skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<String>,
    /// Correctness and the expected answer are only disclosed once the
    /// question has been answered.
    #[serde(rename = "isCorrect", skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(rename = "correctAnswer", skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Serialize)]
pub struct QuizSummaryOut {
    pub score: u32,
    pub total: usize,
    pub percent: u32,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

//
// Conversions
//

/// Current card as the viewer sees it; `EmptyDeck` when nothing is loaded.
pub fn to_flashcard_view(s: &FlashcardSession) -> Result<FlashcardViewOut, StateError> {
    let card = s.current()?;
    Ok(FlashcardViewOut {
        term: card.term.clone(),
        definition: s.revealed().then(|| card.definition.clone()),
        index: s.cursor(),
        total: s.len(),
        revealed: s.revealed(),
    })
}

pub fn to_handoff_out(h: QuizHandoff) -> QuizHandoffOut {
    QuizHandoffOut { redirect: h.redirect, auto_generate: h.auto_generate }
}

/// Full quiz state snapshot for the frontend.
pub fn to_quiz_state(q: &QuizSession) -> QuizStateOut {
    let phase = match q.phase() {
        QuizPhase::Idle => "idle",
        QuizPhase::Loading => "loading",
        QuizPhase::Active => "active",
    };

    let question = q.current_question().ok().map(|question| {
        let answer = q.current_answer();
        let answered = answer.is_some_and(|a| a.is_answered());
        QuizQuestionOut {
            question: question.question.clone(),
            options: question.options.clone(),
            answered,
            selected_answer: answer.and_then(|a| a.selected_answer.clone()),
            is_correct: answered.then(|| answer.map_or(false, |a| a.is_correct)),
            correct_answer: answered.then(|| question.correct_answer.clone()),
        }
    });

    QuizStateOut {
        phase,
        question,
        index: q.cursor(),
        total: q.len(),
        score: q.score(),
        complete: q.is_complete(),
        summary: q
            .summary()
            .map(|s| QuizSummaryOut { score: s.score, total: s.total, percent: s.percent }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Question;

    #[test]
    fn hidden_definition_is_omitted_from_the_view() {
        let mut s = FlashcardSession::default();
        s.open(vec![Flashcard { term: "t".into(), definition: "d".into() }]);
        let view = to_flashcard_view(&s).unwrap();
        assert_eq!(view.definition, None);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("definition").is_none());

        s.flip().unwrap();
        let view = to_flashcard_view(&s).unwrap();
        assert_eq!(view.definition.as_deref(), Some("d"));
    }

    #[test]
    fn correct_answer_is_withheld_until_answered() {
        let mut q = QuizSession::default();
        q.begin_loading(true).unwrap();
        q.succeed_loading(vec![Question {
            question: "q?".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: "a".into(),
        }]);

        let out = to_quiz_state(&q);
        let question = out.question.unwrap();
        assert!(!question.answered);
        assert!(question.correct_answer.is_none());
        assert!(question.is_correct.is_none());

        q.answer("b").unwrap();
        let out = to_quiz_state(&q);
        let question = out.question.unwrap();
        assert_eq!(question.selected_answer.as_deref(), Some("b"));
        assert_eq!(question.is_correct, Some(false));
        assert_eq!(question.correct_answer.as_deref(), Some("a"));
        assert!(out.complete);
        assert_eq!(out.summary.unwrap().percent, 0);
    }
}
