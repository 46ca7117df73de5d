//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use dyslexia_core::ports::{DatabaseService, LevelAssessmentService, OcrService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Holds only handles to the ports; no request data is cached here.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub ocr: Arc<dyn OcrService>,
    /// `None` when no LLM key is configured; assessment then uses the rules only.
    pub assessor: Option<Arc<dyn LevelAssessmentService>>,
}
