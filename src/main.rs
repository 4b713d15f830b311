//! Flashdeck · PDF-to-flashcards backend
//!
//! - Axum HTTP API: generation endpoints + session API
//! - OpenAI-compatible model integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   OPENAI_API_KEY    : enables generation if present
//!   OPENAI_BASE_URL    : default "https://api.openai.com/v1"
//!   OPENAI_MODEL  : default "gpt-4o-mini"
//!   APP_CONFIG_PATH  : path to TOML config (prompts + limits)
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod schema;
mod error;
mod config;
mod store;
mod gateway;
mod flashcards;
mod quiz;
mod upload;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (deck store, sessions, model client, prompts).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "flashdeck_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
