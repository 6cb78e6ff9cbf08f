pub mod health;
pub mod simulate;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// /health      liveness and in-flight job count
/// /simulate    job submission (POST)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(simulate::router())
}
