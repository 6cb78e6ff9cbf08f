//! Simulation engine boundary.
//!
//! [`SimulationEngine`] is the seam between job orchestration and the
//! numerical solver. The orchestrator only depends on this trait, so the
//! built-in [`SingleCellSolver`] can be swapped for a heavier
//! electrochemical backend (or a test double) without touching the
//! service plumbing.
//!
//! `solve` is synchronous and CPU-bound by contract; callers on an async
//! runtime must run it via `tokio::task::spawn_blocking`. Implementations
//! must be reentrant: each call owns its entire solver state, so jobs for
//! different ids can solve concurrently without locks.

pub mod parameters;
pub mod solver;

pub use parameters::CellParameters;
pub use solver::SingleCellSolver;

use battsim_core::series::Sample;

/// Errors raised by a simulation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The solver could not integrate the model with the given parameters
    /// (infeasible cutoff window, convergence failure, ...).
    #[error("Solver error: {0}")]
    Solver(String),
}

/// A numerical solver producing a voltage/current/capacity time series
/// for given cell parameters and duration.
pub trait SimulationEngine: Send + Sync + 'static {
    /// Integrate the cell model from `t = 0` to `duration_secs`.
    ///
    /// Preconditions (guaranteed by the normalizer): `duration_secs > 0`,
    /// `params.upper_voltage_cutoff_v > params.lower_voltage_cutoff_v > 0`,
    /// `params.nominal_capacity_ah > 0`.
    ///
    /// On success the returned series has its first sample at `t = 0`,
    /// non-decreasing times, and a last sample at or before
    /// `duration_secs`. On failure no partial series is returned.
    fn solve(&self, params: &CellParameters, duration_secs: f64) -> Result<Vec<Sample>, EngineError>;
}
