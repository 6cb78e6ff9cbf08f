//! Handlers for the `/simulate` resource.

use axum::extract::State;
use axum::{routing::post, Json, Router};
use serde::Serialize;

use battsim_core::request::{normalize, RawSimulationRequest};
use battsim_core::series::Sample;

use crate::error::AppResult;
use crate::state::AppState;

/// Acknowledgement returned to the submitter.
///
/// `simulationResults` is always null under the non-blocking contract --
/// the authoritative outcome arrives later via callback. The field is kept
/// because the job manager's parser expects it.
#[derive(Serialize)]
pub struct SimulateResponse {
    #[serde(rename = "jobStarted")]
    pub job_started: bool,
    #[serde(rename = "simulationResults")]
    pub simulation_results: Option<Vec<Sample>>,
}

/// POST /simulate
///
/// Normalize and validate the request, then dispatch the job. Returns as
/// soon as the job is accepted; never waits for the solve. Validation
/// failures map to 400, a duplicate in-flight id to 409.
async fn simulate(
    State(state): State<AppState>,
    Json(raw): Json<RawSimulationRequest>,
) -> AppResult<Json<SimulateResponse>> {
    let request = normalize(raw)?;
    let handle = state.orchestrator.submit(request).await?;

    tracing::info!(job_id = %handle.id(), "Simulation job started");

    Ok(Json(SimulateResponse {
        job_started: true,
        simulation_results: None,
    }))
}

/// Mount simulation routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/simulate", post(simulate))
}
