/// Outbound HTTP dispatch for configured actions
///
/// Turns an action name into one HTTP request built from its `config.json`
/// entry. Failures never reach the inbound client; they are logged and the
/// outcome is returned for callers that care (tests, mostly).

use crate::config::{ActionEntry, ActionsConfig};
use chrono::{SecondsFormat, Utc};
use reqwest::Method;
use serde_json::Value;
use std::{future::Future, sync::Arc};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the dispatch time on every outbound call
pub const TIMESTAMP_HEADER: &str = "X-Event-Timestamp";

/// Why a dispatch made no network call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No entry with this name
    UnknownAction,
    /// Entry exists but has no `url`
    MissingUrl,
    /// Entry has no `method`
    MissingMethod,
    /// `method` is not a valid HTTP method token
    InvalidMethod(String),
}

/// Result of a single dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing was sent
    Skipped(SkipReason),
    /// The request completed with this status (any status counts)
    Sent { status: u16 },
    /// Transport-level failure (connect, DNS, timeout, ...)
    Failed(String),
}

/// How a supervised background task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEnd {
    Completed,
    Panicked,
    Cancelled,
}

/// Dispatcher holding the read-only action table and a shared HTTP client
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    config: Arc<ActionsConfig>,
    client: reqwest::Client,
}

impl ActionDispatcher {
    /// Create new dispatcher over a loaded action table
    pub fn new(config: Arc<ActionsConfig>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Fire-and-forget dispatch
    ///
    /// Returns immediately. A supervising task watches the dispatch so a panic
    /// inside it is logged rather than lost.
    pub fn spawn(&self, action: String) {
        let dispatcher = self.clone();
        let dispatch_id = Uuid::new_v4();
        let span = tracing::info_span!("dispatch", action = %action, %dispatch_id);

        supervise(
            dispatch_id,
            async move {
                dispatcher.dispatch(&action).await;
            }
            .instrument(span),
        );
    }

    /// Dispatch an action and wait for the outcome
    pub async fn dispatch(&self, action: &str) -> DispatchOutcome {
        let Some(entry) = self.config.action(action) else {
            tracing::info!("⏭️ Action '{}' skipped: not configured", action);
            return DispatchOutcome::Skipped(SkipReason::UnknownAction);
        };

        let Some(url) = entry.url.as_deref() else {
            tracing::info!("⏭️ Action '{}' skipped: no url configured", action);
            return DispatchOutcome::Skipped(SkipReason::MissingUrl);
        };

        let method = match parse_method(entry) {
            Ok(method) => method,
            Err(reason) => {
                tracing::warn!("⏭️ Action '{}' skipped: {:?}", action, reason);
                return DispatchOutcome::Skipped(reason);
            }
        };

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        tracing::debug!("🌍 Dispatching {} {} for action '{}'", method, url, action);

        let mut request_builder = self.client.request(method.clone(), url);

        for (key, value) in &entry.headers {
            if key.eq_ignore_ascii_case(TIMESTAMP_HEADER) {
                tracing::debug!("🕒 Configured {} on action '{}' replaced by dispatch time", key, action);
                continue;
            }
            match header_value(value) {
                Some(header_value) => {
                    request_builder = request_builder.header(key.as_str(), header_value);
                }
                None => {
                    tracing::warn!("⚠️ Ignoring non-scalar header '{}' on action '{}'", key, action);
                }
            }
        }
        request_builder = request_builder.header(TIMESTAMP_HEADER, timestamp.as_str());

        if let Some(template) = &entry.body {
            if method == Method::POST {
                let body = build_body(template, action, &timestamp);
                tracing::debug!("📦 Request body: {}", body);
                request_builder = request_builder.json(&body);
            } else {
                tracing::debug!("📦 Body template ignored for {} action '{}'", method, action);
            }
        }

        match request_builder.send().await {
            Ok(response) => {
                let status = response.status();
                tracing::info!("✅ Action '{}' dispatched: {} {} (status: {})", action, method, url, status);
                DispatchOutcome::Sent {
                    status: status.as_u16(),
                }
            }
            Err(e) => {
                tracing::error!("❌ Action '{}' dispatch failed: {}", action, e);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Run `task` in the background and log how it ended
///
/// A panic stays inside the task; the supervising handle resolves to `TaskEnd::Panicked`.
pub fn supervise<F>(dispatch_id: Uuid, task: F) -> JoinHandle<TaskEnd>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(task);

    tokio::spawn(async move {
        match handle.await {
            Ok(()) => TaskEnd::Completed,
            Err(e) if e.is_panic() => {
                tracing::error!("💥 Dispatch task {} panicked: {}", dispatch_id, e);
                TaskEnd::Panicked
            }
            Err(_) => {
                tracing::warn!("⚠️ Dispatch task {} was cancelled", dispatch_id);
                TaskEnd::Cancelled
            }
        }
    })
}

/// Resolve the entry's method, upper-cased
fn parse_method(entry: &ActionEntry) -> Result<Method, SkipReason> {
    let raw = entry.method.as_deref().ok_or(SkipReason::MissingMethod)?;
    let upper = raw.trim().to_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| SkipReason::InvalidMethod(raw.to_string()))
}

/// Render a configured header value; objects, arrays and null are rejected
fn header_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Template fields plus `event` and `timestamp`; injected fields win
pub fn build_body(template: &serde_json::Map<String, Value>, action: &str, timestamp: &str) -> Value {
    let mut body = template.clone();
    body.insert("event".to_string(), Value::String(action.to_string()));
    body.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
    Value::Object(body)
}
