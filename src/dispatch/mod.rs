/// Action dispatch
///
/// Builds and sends the outbound HTTP call for a configured action, either
/// awaited (`dispatch`) or detached from the caller (`spawn`).

pub mod dispatcher;

pub use dispatcher::{supervise, ActionDispatcher, DispatchOutcome, SkipReason, TaskEnd, TIMESTAMP_HEADER};
