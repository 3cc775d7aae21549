/// Request middleware, applied to every path
///
/// Order is fixed by `server::create_app`: `log_action` runs first, then
/// `require_api_key`, then routing.

use crate::api::{ActionQuery, AppState};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Log the requested action, if any, and continue
pub async fn log_action(req: Request, next: Next) -> Response {
    if let Some(action) = ActionQuery::from_uri(req.uri()).action() {
        tracing::info!("Action: {}", action);
    }
    next.run(req).await
}

/// Reject requests whose `apiKey` does not exactly match the configured secret
///
/// With no (or an empty) secret configured every request is rejected.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let query = ActionQuery::from_uri(req.uri());
    let authorized = match (state.api_key.as_deref(), query.api_key.as_deref()) {
        (Some(expected), Some(given)) => !expected.is_empty() && expected == given,
        _ => false,
    };

    if !authorized {
        tracing::warn!("🔒 Rejected request to {} with missing or invalid API key", req.uri().path());
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid API key" })),
        )
            .into_response();
    }

    next.run(req).await
}
