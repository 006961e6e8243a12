//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use creator_studio_core::CreationPipeline;

/// The shared application state, created once at startup and passed to all handlers.
///
/// The pipeline owns one `Arc` per collaborator port, so handlers never touch
/// an adapter directly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: CreationPipeline,
}
