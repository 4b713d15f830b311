//! Loading service configuration (prompts + limits) from TOML.
//!
//! See `AppConfig`, `Prompts` and `Limits` for the expected schema.

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub limits: Limits,
}

/// Prompts used by the generation gateway. Defaults reproduce the fixed
/// instructions the flow was designed around; override in TOML to tune tone.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub flashcard_system: String,
  pub flashcard_user: String,
  pub question_system: String,
  pub question_user: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      flashcard_system: "You are an educator. Your job is to take the content of a PDF document and convert it into a series of flashcards. Each flashcard should include a term and a concise definition. Respond ONLY with a JSON array of objects, each with string fields \"term\" and \"definition\". No prose, no code fences.".into(),
      flashcard_user: "Generate flashcards based on the following document.".into(),
      question_system: "You are a teacher. Create a multiple choice test based on the following flashcards. Each question should include one correct answer and three distractors. Total number of questions should be as much as the number of flashcards. Respond ONLY with a JSON array of objects, each with a string field \"question\", an \"options\" array of exactly 4 strings, and a string field \"correctAnswer\" equal to one of the options. No prose, no code fences.".into(),
      question_user: "Generate test questions based on these flashcards.".into(),
    }
  }
}

/// Hard bounds on the upload/generation flow.
#[derive(Clone, Debug, Deserialize)]
pub struct Limits {
  /// Maximum accepted PDF payload, after base64 decoding.
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
  /// Wall-clock ceiling for one generation call, streamed body included.
  #[serde(default = "default_generation_timeout_secs")]
  pub generation_timeout_secs: u64,
}

fn default_max_upload_bytes() -> usize {
  5 * 1024 * 1024
}
fn default_generation_timeout_secs() -> u64 {
  60
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      max_upload_bytes: default_max_upload_bytes(),
      generation_timeout_secs: default_generation_timeout_secs(),
    }
  }
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "flashdeck_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "flashdeck_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "flashdeck_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn limits_default_to_the_documented_bounds() {
    let limits = Limits::default();
    assert_eq!(limits.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(limits.generation_timeout_secs, 60);
  }

  #[test]
  fn partial_toml_falls_back_to_defaults() {
    let cfg: AppConfig = toml::from_str("[limits]\nmax_upload_bytes = 1024\n").unwrap();
    assert_eq!(cfg.limits.max_upload_bytes, 1024);
    assert_eq!(cfg.limits.generation_timeout_secs, 60);
    assert!(cfg.prompts.flashcard_system.contains("educator"));
  }
}
