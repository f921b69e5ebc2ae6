use crate::errors::{EngineError, EngineResult};
use crate::models::{binomial, PricingResult};
use crate::state::AppState;
use crate::validation::{self, CalculateRequest};
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;
use tracing::Instrument;

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// POST /calculate -- validate the body, price the lattice, return the full result
pub async fn calculate(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request_id = uuid::Uuid::new_v4();
    state.counters.record_request();

    let outcome = price_body(&state, &body)
        .instrument(tracing::info_span!("calculate", %request_id))
        .await;

    match outcome {
        Ok(result) => {
            state.counters.record_priced();
            Json(result).into_response()
        }
        Err(e) if e.is_rejection() => {
            state.counters.record_rejected();
            tracing::warn!(%request_id, error = %e, "request rejected");
            e.into_response()
        }
        Err(e) => {
            state.counters.record_failed();
            if e.status_code().is_server_error() {
                tracing::error!(%request_id, error = %e, "pricing failed");
            } else {
                tracing::warn!(%request_id, error = %e, "pricing refused");
            }
            e.into_response()
        }
    }
}

async fn price_body(state: &AppState, body: &[u8]) -> EngineResult<PricingResult> {
    let raw: CalculateRequest = serde_json::from_slice(body)?;
    let request = validation::validate(&raw, state.config.max_steps)?;

    tracing::debug!(
        spot = request.spot,
        strike = request.strike,
        maturity = request.maturity,
        rate = request.rate,
        volatility = request.volatility,
        steps = request.steps,
        "pricing request accepted"
    );

    // O(n^2) work stays off the async workers.
    tokio::task::spawn_blocking(move || binomial::price(&request)).await?
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "requests": state.counters.requests.load(Relaxed),
        "priced": state.counters.priced.load(Relaxed),
        "rejected": state.counters.rejected.load(Relaxed),
        "failed": state.counters.failed.load(Relaxed),
    }))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
