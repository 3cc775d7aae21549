/// relayhook: authenticated GET pings in, configured HTTP calls out
///
/// This library provides the action table loader, the outbound dispatcher and
/// the single-route HTTP front door.

// Core configuration and `${VAR}` substitution
pub mod config;

// Outbound HTTP dispatch for configured actions
pub mod dispatch;

// HTTP API layer - middleware and the relay route
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use config::{ActionEntry, ActionsConfig, Config};
pub use dispatch::{ActionDispatcher, DispatchOutcome, SkipReason};
pub use server::{create_app, start_server};
