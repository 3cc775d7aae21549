/// The single relay endpoint
///
/// GET /?action=<name>&apiKey=<secret>
/// Authentication happens in middleware; by the time this runs the key is valid.

use crate::api::{ActionQuery, AppState};
use axum::{extract::State, http::Uri, routing::get, Router};

/// Static greeting returned for every authorized request
pub const GREETING: &str = "Hello world!";

/// Create the relay route
pub fn create_root_routes() -> Router<AppState> {
    Router::new().route("/", get(relay_action))
}

/// Kick off the requested action without waiting and answer immediately
///
/// The response never reflects the dispatch outcome.
async fn relay_action(State(state): State<AppState>, uri: Uri) -> &'static str {
    if let Some(action) = ActionQuery::from_uri(&uri).action() {
        tracing::debug!("🚀 Spawning dispatch for action '{}'", action);
        state.dispatcher.spawn(action.to_string());
    }
    GREETING
}
