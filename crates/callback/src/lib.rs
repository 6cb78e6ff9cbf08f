//! Callback delivery to the job manager.
//!
//! The orchestrator hands every terminal job outcome to an [`OutcomeSink`].
//! The production implementation, [`CallbackDispatcher`], POSTs the outcome
//! to the job manager's configured callback URL with bounded retry and
//! exponential backoff; tests substitute an in-memory recorder.

pub mod delivery;

pub use delivery::{callback_payload, CallbackDispatcher, CallbackError};

use battsim_core::job::JobOutcome;
use battsim_core::types::JobId;

/// Receiver of terminal job outcomes.
///
/// Delivery is best-effort at-least-once: a sink may retry internally, so
/// the job manager must tolerate duplicate deliveries of the same outcome.
/// A sink must never block one job's delivery on another's.
#[async_trait::async_trait]
pub trait OutcomeSink: Send + Sync + 'static {
    /// Deliver one job's terminal outcome.
    ///
    /// An `Err` means the local retry budget is exhausted; the caller logs
    /// it as a terminal local condition and must not regress job state.
    async fn deliver(&self, job_id: &JobId, outcome: &JobOutcome) -> Result<(), CallbackError>;
}
