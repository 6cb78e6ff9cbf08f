//! Job orchestrator: lifecycle ownership and non-blocking dispatch.
//!
//! [`JobOrchestrator`] owns every in-flight [`Job`]. `submit` registers the
//! job and spawns a Tokio task that runs the engine via `spawn_blocking`,
//! records the terminal outcome, and hands it to the [`OutcomeSink`] -- so
//! the accepting path returns immediately and one job's latency or failure
//! never blocks acceptance of others. Each job owns its parameter set and
//! result buffer; the only shared structure is the in-flight map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use battsim_callback::OutcomeSink;
use battsim_core::error::{CoreError, ErrorInfo};
use battsim_core::job::{Job, JobOutcome, JobState};
use battsim_core::request::SimulationRequest;
use battsim_core::types::JobId;
use battsim_engine::{CellParameters, EngineError, SimulationEngine};

/// Handle to an accepted job.
///
/// Dropping the handle detaches the job; it runs to completion and reports
/// via callback either way.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    task: tokio::task::JoinHandle<()>,
}

impl JobHandle {
    /// The id the outcome callback will carry (generated if the request
    /// arrived without one).
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Await the full solve-and-deliver path. Used by tests and shutdown,
    /// never by the accepting path.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// Owns the lifecycle of all in-flight simulation jobs.
///
/// Created once at startup; the returned `Arc` is cheap to clone into
/// request handlers.
pub struct JobOrchestrator {
    engine: Arc<dyn SimulationEngine>,
    sink: Arc<dyn OutcomeSink>,
    solver_timeout: Option<Duration>,
    /// In-flight jobs indexed by id. Entries are removed once the terminal
    /// outcome has been handed to the sink; nothing is persisted.
    in_flight: RwLock<HashMap<JobId, Job>>,
}

impl JobOrchestrator {
    pub fn new(
        engine: Arc<dyn SimulationEngine>,
        sink: Arc<dyn OutcomeSink>,
        solver_timeout: Option<Duration>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            sink,
            solver_timeout,
            in_flight: RwLock::new(HashMap::new()),
        })
    }

    /// Accept a normalized request and dispatch its job.
    ///
    /// Returns immediately, without waiting for the engine. A request whose
    /// id is already Pending or Running is rejected with
    /// [`CoreError::Conflict`] so no second engine invocation can start for
    /// the same id; once the first job reaches a terminal state the id may
    /// be reused.
    pub async fn submit(self: &Arc<Self>, request: SimulationRequest) -> Result<JobHandle, CoreError> {
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        {
            let mut jobs = self.in_flight.write().await;
            if jobs.contains_key(&id) {
                return Err(CoreError::Conflict(id));
            }
            jobs.insert(id.clone(), Job::new(id.clone(), request.clone()));
        }

        tracing::info!(
            job_id = %id,
            duration_hours = request.duration_hours,
            control_current_a = request.control_current_a,
            "Job accepted",
        );

        let orchestrator = Arc::clone(self);
        let job_id = id.clone();
        let task = tokio::spawn(async move {
            orchestrator.run_job(job_id, request).await;
        });

        Ok(JobHandle { id, task })
    }

    /// Number of jobs currently Pending or Running.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.read().await.len()
    }

    /// Current state of an in-flight job, if the id is known.
    ///
    /// Returns `None` once the job's outcome has been handed off and the
    /// entry discarded.
    pub async fn state_of(&self, id: &str) -> Option<JobState> {
        self.in_flight.read().await.get(id).map(|job| job.state())
    }

    /// Drive one job from Running to its terminal state and hand the
    /// outcome to the sink.
    async fn run_job(self: Arc<Self>, id: JobId, request: SimulationRequest) {
        if let Err(e) = self.transition(&id, |job| job.start()).await {
            tracing::error!(job_id = %id, error = %e, "Failed to start job");
            return;
        }

        let outcome = self.execute(&request).await;

        match &outcome {
            JobOutcome::Succeeded(samples) => {
                tracing::info!(job_id = %id, samples = samples.len(), "Job succeeded");
            }
            JobOutcome::Failed(info) => {
                tracing::warn!(job_id = %id, kind = ?info.kind, error = %info.message, "Job failed");
            }
        }

        if let Err(e) = self.transition(&id, |job| job.complete(&outcome)).await {
            tracing::error!(job_id = %id, error = %e, "Failed to record job outcome");
        }

        // Failure must be reported, not merely logged: the job manager is
        // waiting for an outcome either way.
        if let Err(e) = self.sink.deliver(&id, &outcome).await {
            tracing::error!(
                job_id = %id,
                error = %e,
                "Outcome delivery exhausted its retry budget; outcome dropped locally",
            );
        }

        self.in_flight.write().await.remove(&id);
    }

    /// Run the blocking solve off the async runtime.
    async fn execute(&self, request: &SimulationRequest) -> JobOutcome {
        let params = CellParameters::from(request);
        let duration_secs = request.duration_secs();
        let engine = Arc::clone(&self.engine);

        let solve = tokio::task::spawn_blocking(move || engine.solve(&params, duration_secs));

        let joined = match self.solver_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, solve).await {
                Ok(joined) => joined,
                Err(_) => {
                    // The blocking thread cannot be interrupted; it is
                    // abandoned and its eventual result discarded.
                    return JobOutcome::Failed(ErrorInfo::from(&CoreError::Timeout(
                        timeout.as_secs(),
                    )));
                }
            },
            None => solve.await,
        };

        match joined {
            Ok(Ok(samples)) => JobOutcome::Succeeded(samples),
            Ok(Err(EngineError::Solver(message))) => {
                JobOutcome::Failed(ErrorInfo::solver(message))
            }
            Err(join_err) => JobOutcome::Failed(ErrorInfo::internal(format!(
                "Solver task failed: {join_err}"
            ))),
        }
    }

    /// Apply a state transition to an in-flight job under the write lock.
    async fn transition<F>(&self, id: &str, f: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Job) -> Result<(), CoreError>,
    {
        let mut jobs = self.in_flight.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| CoreError::Internal(format!("Job {id} is not in flight")))?;
        f(job)
    }
}
