use std::sync::Arc;

use crate::orchestrator::JobOrchestrator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Job orchestrator owning all in-flight simulation jobs.
    pub orchestrator: Arc<JobOrchestrator>,
}
