// rest/routes.rs — webhook + health handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::review::EventOutcome;
use crate::AppContext;

/// POST /webhook/gitlab — hand the raw payload to the event processor.
///
/// The event source only ever sees "ok" or "ignored" — pipeline failures are
/// handled (and notified) inside the processor and still answer 200, so a
/// flaky review bot never fails anyone's CI webhook delivery.
pub async fn webhook(
    State(ctx): State<Arc<AppContext>>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    info!("webhook received");
    match ctx.processor.process(&payload).await {
        EventOutcome::Ignored(reason) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "ignored", "reason": reason })),
        ),
        EventOutcome::Processed => (StatusCode::OK, Json(json!({ "status": "ok" }))),
    }
}

/// GET /health — liveness probe for monitors and load balancers.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": ctx.started_at.elapsed().as_secs(),
    }))
}
