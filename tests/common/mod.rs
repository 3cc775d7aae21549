#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use relayhook::{api::AppState, ActionDispatcher, ActionsConfig};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    net::TcpListener,
    sync::{mpsc, Notify},
};

// ---------------------------------------------------------------------------
// Capture server: records every request the dispatcher sends
// ---------------------------------------------------------------------------

/// One request as seen by the capture server.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("captured body is JSON")
    }
}

pub struct CaptureServer {
    pub base_url: String,
    rx: mpsc::UnboundedReceiver<Captured>,
    responded: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct CaptureState {
    tx: mpsc::UnboundedSender<Captured>,
    status: StatusCode,
    gate: Option<Arc<Notify>>,
    responded: Arc<AtomicUsize>,
}

async fn capture(
    State(state): State<CaptureState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let headers = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let _ = state.tx.send(Captured {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        body,
    });
    if let Some(gate) = &state.gate {
        gate.notified().await;
    }
    state.responded.fetch_add(1, Ordering::SeqCst);
    state.status
}

impl CaptureServer {
    /// Start a capture server on an ephemeral port answering every request with `status`.
    pub async fn start(status: StatusCode) -> Self {
        Self::spawn(status, None).await
    }

    /// Like `start`, but each response is withheld until the returned gate is notified.
    pub async fn start_held(status: StatusCode) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (Self::spawn(status, Some(gate.clone())).await, gate)
    }

    async fn spawn(status: StatusCode, gate: Option<Arc<Notify>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let responded = Arc::new(AtomicUsize::new(0));
        let app = Router::new().fallback(capture).with_state(CaptureState {
            tx,
            status,
            gate,
            responded: responded.clone(),
        });
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{}", addr),
            rx,
            responded,
        }
    }

    /// Number of responses the server has finished handing back.
    pub fn responses_sent(&self) -> usize {
        self.responded.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` responses have been handed back.
    pub async fn wait_for_responses(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.responses_sent() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for responses");
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Wait for the next captured request.
    pub async fn next(&mut self) -> Captured {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("timed out waiting for an outbound request")
            .expect("capture channel closed")
    }

    /// Assert that no request arrives within a short grace period.
    pub async fn assert_silent(&mut self) {
        let got = tokio::time::timeout(Duration::from_millis(300), self.rx.recv()).await;
        if let Ok(Some(req)) = got {
            panic!("unexpected outbound request: {:?}", req);
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build an action table from a JSON literal with no environment lookups.
pub fn actions(config: Value) -> Arc<ActionsConfig> {
    Arc::new(ActionsConfig::from_str_with(&config.to_string(), &|_: &str| None).unwrap())
}

pub fn dispatcher(config: Value) -> ActionDispatcher {
    ActionDispatcher::new(actions(config))
}

pub fn app_state(config: Value, api_key: Option<&str>) -> AppState {
    AppState {
        dispatcher: dispatcher(config),
        api_key: api_key.map(Arc::from),
    }
}

/// Port on localhost with nothing listening.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
