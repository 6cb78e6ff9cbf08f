//! Job lifecycle state machine.
//!
//! A [`Job`] is created when a request is accepted and owned exclusively by
//! the orchestrator until it reaches a terminal state and its outcome has
//! been handed to the callback dispatcher. Transitions are monotonic:
//! `Pending -> Running -> {Succeeded, Failed}`; nothing leaves a terminal
//! state.

use crate::error::{CoreError, ErrorInfo};
use crate::request::SimulationRequest;
use crate::series::Sample;
use crate::types::{JobId, Timestamp};

/// Job execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    /// Whether the state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// Terminal result of a job: the full sample series, or a classified failure.
///
/// A job produces at most one outcome, and the outcome is delivered to the
/// job manager at most once per delivery attempt cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Succeeded(Vec<Sample>),
    Failed(ErrorInfo),
}

impl JobOutcome {
    /// The job state this outcome transitions into.
    pub fn terminal_state(&self) -> JobState {
        match self {
            JobOutcome::Succeeded(_) => JobState::Succeeded,
            JobOutcome::Failed(_) => JobState::Failed,
        }
    }
}

/// One accepted simulation request and its lifecycle through completion.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    request: SimulationRequest,
    state: JobState,
    created_at: Timestamp,
}

impl Job {
    /// Create a job in `Pending` state.
    pub fn new(id: JobId, request: SimulationRequest) -> Self {
        Self {
            id,
            request,
            state: JobState::Pending,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn request(&self) -> &SimulationRequest {
        &self.request
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Transition `Pending -> Running`.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.state != JobState::Pending {
            return Err(CoreError::Internal(format!(
                "Invalid transition: job {} is {:?}, expected Pending",
                self.id, self.state
            )));
        }
        self.state = JobState::Running;
        Ok(())
    }

    /// Transition `Running -> {Succeeded, Failed}` per the outcome.
    pub fn complete(&mut self, outcome: &JobOutcome) -> Result<(), CoreError> {
        if self.state != JobState::Running {
            return Err(CoreError::Internal(format!(
                "Invalid transition: job {} is {:?}, expected Running",
                self.id, self.state
            )));
        }
        self.state = outcome.terminal_state();
        Ok(())
    }
}
