//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use docqa_core::SessionController;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// There is exactly one document session per process.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionController>,
}
