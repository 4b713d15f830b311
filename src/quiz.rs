//! Quiz session state machine.
//!
//! Phases run Idle -> Loading -> Active. "Complete" is not a stored phase but
//! the observable condition: cursor on the last question and that question
//! answered. Answers are immutable once set; the score is monotone and only a
//! full regeneration (retake) resets it.

use crate::domain::{AnswerSlot, Question};
use crate::error::StateError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
  Idle,
  Loading,
  Active,
}

pub struct QuizSession {
  phase: QuizPhase,
  questions: Vec<Question>,
  answers: Vec<AnswerSlot>,
  cursor: usize,
  score: u32,
}

impl Default for QuizSession {
  fn default() -> Self {
    Self { phase: QuizPhase::Idle, questions: Vec::new(), answers: Vec::new(), cursor: 0, score: 0 }
  }
}

/// Final result shown once the quiz is complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSummary {
  pub score: u32,
  pub total: usize,
  pub percent: u32,
}

impl QuizSession {
  pub fn phase(&self) -> QuizPhase {
    self.phase
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  /// Enter Loading. Requires a non-empty deck and no generation in flight.
  /// Prior questions, answers and score are discarded up front so a failure
  /// lands back in a clean Idle.
  pub fn begin_loading(&mut self, deck_has_cards: bool) -> Result<(), StateError> {
    if self.phase == QuizPhase::Loading {
      return Err(StateError::Busy);
    }
    if !deck_has_cards {
      return Err(StateError::NoDeckForQuiz);
    }
    *self = Self { phase: QuizPhase::Loading, ..Self::default() };
    Ok(())
  }

  /// Loading -> Active: install the questions, allocate unanswered slots,
  /// reset cursor and score.
  pub fn succeed_loading(&mut self, questions: Vec<Question>) {
    self.answers = vec![AnswerSlot::default(); questions.len()];
    self.questions = questions;
    self.cursor = 0;
    self.score = 0;
    self.phase = QuizPhase::Active;
  }

  /// Loading -> Idle: no partial state is retained.
  pub fn fail_loading(&mut self) {
    *self = Self::default();
  }

  pub fn current_question(&self) -> Result<&Question, StateError> {
    if self.phase != QuizPhase::Active {
      return Err(StateError::NoQuestions);
    }
    self.questions.get(self.cursor).ok_or(StateError::NoQuestions)
  }

  pub fn current_answer(&self) -> Option<&AnswerSlot> {
    self.answers.get(self.cursor)
  }

  /// Record a choice for the current question. The first call decides; any
  /// later call for the same question is ignored and the recorded slot is
  /// returned unchanged. The score increments iff the first choice is correct.
  pub fn answer(&mut self, choice: &str) -> Result<&AnswerSlot, StateError> {
    if self.phase != QuizPhase::Active {
      return Err(StateError::NoQuestions);
    }
    let question = self.questions.get(self.cursor).ok_or(StateError::NoQuestions)?;
    let slot = &mut self.answers[self.cursor];
    if !slot.is_answered() {
      let is_correct = choice == question.correct_answer;
      slot.selected_answer = Some(choice.to_string());
      slot.is_correct = is_correct;
      if is_correct {
        self.score += 1;
      }
    }
    Ok(&self.answers[self.cursor])
  }

  /// Advance to the next question; requires the current one answered.
  /// Clamps at the last index (no wrap).
  pub fn next(&mut self) -> Result<(), StateError> {
    if self.phase != QuizPhase::Active {
      return Err(StateError::NoQuestions);
    }
    if !self.answers.get(self.cursor).map_or(false, AnswerSlot::is_answered) {
      return Err(StateError::Unanswered);
    }
    self.advance();
    Ok(())
  }

  /// Advance without answering. Clamps at the last index (no wrap).
  pub fn skip(&mut self) -> Result<(), StateError> {
    if self.phase != QuizPhase::Active {
      return Err(StateError::NoQuestions);
    }
    self.advance();
    Ok(())
  }

  fn advance(&mut self) {
    if self.cursor + 1 < self.questions.len() {
      self.cursor += 1;
    }
  }

  /// Complete means: on the last question, and that question is answered.
  /// Skipping to the end alone never completes the quiz.
  pub fn is_complete(&self) -> bool {
    self.phase == QuizPhase::Active
      && !self.questions.is_empty()
      && self.cursor == self.questions.len() - 1
      && self.answers[self.cursor].is_answered()
  }

  pub fn summary(&self) -> Option<QuizSummary> {
    if !self.is_complete() {
      return None;
    }
    let total = self.questions.len();
    let percent = ((self.score as f32 / total as f32) * 100.0).round() as u32;
    Some(QuizSummary { score: self.score, total, percent })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(n: usize) -> Question {
    Question {
      question: format!("Question {n}?"),
      options: vec![format!("right {n}"), "wrong a".into(), "wrong b".into(), "wrong c".into()],
      correct_answer: format!("right {n}"),
    }
  }

  fn active_session(n: usize) -> QuizSession {
    let mut quiz = QuizSession::default();
    quiz.begin_loading(true).unwrap();
    quiz.succeed_loading((0..n).map(question).collect());
    quiz
  }

  #[test]
  fn generate_requires_a_deck() {
    let mut quiz = QuizSession::default();
    assert!(matches!(quiz.begin_loading(false), Err(StateError::NoDeckForQuiz)));
    assert_eq!(quiz.phase(), QuizPhase::Idle);
  }

  #[test]
  fn loading_is_single_flight() {
    let mut quiz = QuizSession::default();
    quiz.begin_loading(true).unwrap();
    assert!(matches!(quiz.begin_loading(true), Err(StateError::Busy)));
  }

  #[test]
  fn failure_returns_to_idle_with_nothing_retained() {
    let mut quiz = active_session(2);
    quiz.answer("right 0").unwrap();
    quiz.begin_loading(true).unwrap();
    quiz.fail_loading();
    assert_eq!(quiz.phase(), QuizPhase::Idle);
    assert_eq!(quiz.len(), 0);
    assert_eq!(quiz.score(), 0);
  }

  #[test]
  fn all_correct_scores_full_marks() {
    let n = 4;
    let mut quiz = active_session(n);
    for i in 0..n {
      quiz.answer(&format!("right {i}")).unwrap();
      if i + 1 < n {
        quiz.next().unwrap();
      }
    }
    let summary = quiz.summary().unwrap();
    assert_eq!(summary.score, n as u32);
    assert_eq!(summary.percent, 100);
  }

  #[test]
  fn answers_are_immutable_once_set() {
    let mut quiz = active_session(1);
    quiz.answer("wrong a").unwrap();
    let slot = quiz.answer("right 0").unwrap();
    assert_eq!(slot.selected_answer.as_deref(), Some("wrong a"));
    assert!(!slot.is_correct);
    assert_eq!(quiz.score(), 0);
  }

  #[test]
  fn next_requires_an_answer_but_skip_does_not() {
    let mut quiz = active_session(3);
    assert!(matches!(quiz.next(), Err(StateError::Unanswered)));
    quiz.skip().unwrap();
    assert_eq!(quiz.cursor(), 1);
  }

  #[test]
  fn cursor_clamps_at_the_last_question() {
    let mut quiz = active_session(2);
    quiz.skip().unwrap();
    quiz.skip().unwrap();
    assert_eq!(quiz.cursor(), 1);
    quiz.answer("right 1").unwrap();
    quiz.next().unwrap();
    assert_eq!(quiz.cursor(), 1);
  }

  #[test]
  fn skip_to_the_end_does_not_complete() {
    let mut quiz = active_session(3);
    quiz.answer("right 0").unwrap();
    quiz.next().unwrap();
    quiz.answer("wrong a").unwrap();
    quiz.next().unwrap();
    // Q3 skipped to, but unanswered: no summary yet.
    assert!(!quiz.is_complete());
    assert!(quiz.summary().is_none());
    // Answering Q3 is what reveals the summary.
    quiz.answer("wrong b").unwrap();
    let summary = quiz.summary().unwrap();
    assert_eq!(summary.score, 1);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.percent, 33);
  }

  #[test]
  fn retake_resets_score_and_slots() {
    let mut quiz = active_session(2);
    quiz.answer("right 0").unwrap();
    quiz.next().unwrap();
    quiz.answer("right 1").unwrap();
    assert_eq!(quiz.score(), 2);

    quiz.begin_loading(true).unwrap();
    quiz.succeed_loading((0..2).map(question).collect());
    assert_eq!(quiz.score(), 0);
    assert_eq!(quiz.cursor(), 0);
    assert!(quiz.current_answer().is_some_and(|a| !a.is_answered()));
  }

  #[test]
  fn answering_outside_active_is_rejected() {
    let mut quiz = QuizSession::default();
    assert!(matches!(quiz.answer("x"), Err(StateError::NoQuestions)));
    quiz.begin_loading(true).unwrap();
    assert!(matches!(quiz.answer("x"), Err(StateError::NoQuestions)));
  }
}
