/// HTTP API Layer
///
/// This module provides the front door of the relay:
/// - Action logging and API key middleware
/// - The single `GET /` route that triggers dispatch

use crate::dispatch::ActionDispatcher;
use axum::{extract::Query, http::Uri};
use std::sync::Arc;

// Logging and authentication middleware
pub mod middleware;

// `GET /` relay endpoint
pub mod root;

pub use root::create_root_routes;

/// Application state shared by middleware and handlers
#[derive(Clone)]
pub struct AppState {
    /// Dispatcher over the loaded action table
    pub dispatcher: ActionDispatcher,
    /// Expected `apiKey` value; `None` rejects everything
    pub api_key: Option<Arc<str>>,
}

/// Query parameters understood by the relay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionQuery {
    /// Action to dispatch
    pub action: Option<String>,
    /// Shared secret
    pub api_key: Option<String>,
}

impl ActionQuery {
    /// Read `action` and `apiKey` from the request URI
    ///
    /// Repeated parameters keep their first value; unknown parameters are ignored.
    pub fn from_uri(uri: &Uri) -> Self {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "action" => &mut query.action,
                "apiKey" => &mut query.api_key,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Requested action name; an empty `action=` counts as absent
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref().filter(|a| !a.is_empty())
    }
}
