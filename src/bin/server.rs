#[macro_use]
extern crate log;

use std::{sync::Arc, time::{Duration, SystemTime, UNIX_EPOCH}};

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use totp56::{config::Settings, Totp};

type ArcAppState = Arc<AppState>;

/// Shared read-only; `Totp` never changes after construction.
struct AppState {
  totp: Totp,
  settings: Settings,
}

#[derive(Clone, serde::Serialize, serde::Deserialize, Debug)]
struct ValidateParam {
  code: String,
  /// unix seconds, defaults to now
  at: Option<u64>,
  /// seconds, defaults to `TOTP_LENIENCY`
  leniency: Option<u64>,
}

#[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct ValidateResult {
  valid: bool,
}

async fn health() -> &'static str {
  "ok"
}

async fn validate(State(state): State<ArcAppState>, Json(param): Json<ValidateParam>) -> Result<Json<ValidateResult>, (StatusCode, Json<serde_json::Value>)> {
  let leniency = param.leniency.map(Duration::from_secs).unwrap_or(state.settings.leniency);
  let leniency = state.settings.check_leniency(leniency).map_err(|e| {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": e.to_string() })))
  })?;
  let t = param.at.map(|secs| UNIX_EPOCH + Duration::from_secs(secs)).unwrap_or_else(SystemTime::now);
  let valid = state.totp.validate(&param.code, t, leniency);
  debug!("validate at {:?} leniency {:?}: {}", param.at, leniency, valid);
  Ok(Json(ValidateResult { valid }))
}

fn app(totp: Totp, settings: Settings) -> Router {
  let state = Arc::new(AppState { totp, settings });
  Router::new()
    .route("/health", get(health))
    .route("/validate", post(validate))
    .with_state(state)
}

pub async fn serve(totp: Totp, settings: Settings) -> anyhow::Result<()> {
  let listener = tokio::net::TcpListener::bind(&settings.listen).await?;
  info!("listening on {}", listener.local_addr()?);
  axum::serve(listener, app(totp, settings)).await?;
  Ok(())
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
  flexi_logger::Logger::try_with_env_or_str("info")?.start().ok();
  let settings = Settings::from_env()?;
  let totp = settings.totp()?;
  info!("{:?}", totp);
  serve(totp, settings).await
}
