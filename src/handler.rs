//! The probe endpoint
//!
//! Accepts GET or POST, sleeps for the requested number of seconds on a
//! dedicated thread, then answers with a plain-text report of how the
//! request was scheduled (thread, process, timing) and what host it ran on.
//!
//! The endpoint requires no authentication - it only reads ambient OS state
//! and has no side effects beyond its own response.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::host::HostSnapshot;
use crate::report::{self, RequestContext};
use crate::AppState;

/// Create the router exposing the probe endpoint
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_body = state.config.max_body_bytes;
    Router::new()
        .route("/probe", get(probe).post(probe))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ProbeParams {
    /// Seconds to sleep before responding; kept as a string so that a
    /// non-numeric value is rejected here rather than by the extractor
    pub delay: Option<String>,

    /// Caller-chosen label echoed back in the report
    pub id: Option<String>,
}

/// Errors that can fail a probe request
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid delay value {0:?}: expected a non-negative number of seconds")]
    InvalidDelay(String),

    #[error("delay worker failed: {0}")]
    DelayTask(String),
}

impl ProbeError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProbeError::InvalidDelay(_) => StatusCode::BAD_REQUEST,
            ProbeError::DelayTask(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProbeError {
    fn into_response(self) -> Response {
        tracing::warn!("probe request failed: {}", self);
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Handle a probe request
async fn probe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProbeParams>,
    body: Bytes,
) -> Result<String, ProbeError> {
    let start_time = Local::now();
    let process_id = std::process::id();

    // Query string wins; the body is only consulted when the query carries
    // no delay. Empty values and unparsable bodies count as no delay at all.
    let raw_delay = params
        .delay
        .filter(|raw| !raw.is_empty())
        .or_else(|| delay_from_body(&body))
        .filter(|raw| !raw.is_empty());
    let delay_seconds = match raw_delay {
        Some(raw) => parse_delay(&raw)?,
        None => state.config.default_delay_secs,
    };

    let request_id = params
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "anonymous".to_string());

    tracing::info!(
        request_id = %request_id,
        process_id,
        delay_seconds,
        "request started, sleeping before responding"
    );

    // A literal blocking sleep stands in for synchronous work. It runs on a
    // dedicated thread so that every in-flight request occupies exactly one
    // thread while other invocations keep flowing on the async runtime.
    let sleep = Duration::try_from_secs_f64(delay_seconds)
        .map_err(|_| ProbeError::InvalidDelay(delay_seconds.to_string()))?;
    let thread_id = tokio::task::spawn_blocking(move || {
        let id = std::thread::current().id();
        std::thread::sleep(sleep);
        id
    })
    .await
    .map_err(|e| ProbeError::DelayTask(e.to_string()))?;

    let end_time = Local::now();
    let duration_seconds = end_time
        .signed_duration_since(start_time)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    let ctx = RequestContext {
        request_id,
        thread_id,
        process_id,
        start_time,
        end_time,
        duration_seconds,
        delay_seconds,
    };

    tracing::info!(
        request_id = %ctx.request_id,
        duration_seconds,
        "request completed"
    );

    let snapshot = HostSnapshot::capture(&state.config);
    Ok(report::render(&ctx, &snapshot))
}

fn parse_delay(raw: &str) -> Result<f64, ProbeError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ProbeError::InvalidDelay(raw.to_string()))?;
    // Duration's own conversion rejects NaN, negatives, infinities, and
    // values too large to sleep for
    if Duration::try_from_secs_f64(value).is_err() {
        return Err(ProbeError::InvalidDelay(raw.to_string()));
    }
    Ok(value)
}

/// Best-effort read of a `delay` field from a JSON body. Any failure
/// (malformed JSON, missing field, wrong type) means "no delay supplied".
fn delay_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("delay")? {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
