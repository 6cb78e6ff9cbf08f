//! Shared helpers for API integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use battsim_api::orchestrator::JobOrchestrator;
use battsim_api::routes;
use battsim_api::state::AppState;
use battsim_callback::{CallbackError, OutcomeSink};
use battsim_core::job::JobOutcome;
use battsim_core::series::Sample;
use battsim_core::types::JobId;
use battsim_engine::{CellParameters, EngineError, SimulationEngine};

// ---------------------------------------------------------------------------
// Engine test double
// ---------------------------------------------------------------------------

type SolveFn = dyn Fn(&CellParameters, f64) -> Result<Vec<Sample>, EngineError> + Send + Sync;

/// Scriptable engine: behaviour is supplied as a closure, invocations are
/// counted so tests can assert the engine was (or was not) reached.
pub struct MockEngine {
    calls: AtomicUsize,
    solve_fn: Box<SolveFn>,
}

impl MockEngine {
    pub fn new(
        solve_fn: impl Fn(&CellParameters, f64) -> Result<Vec<Sample>, EngineError>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            solve_fn: Box::new(solve_fn),
        })
    }

    /// Engine that always succeeds with a two-sample series.
    pub fn succeeding() -> Arc<Self> {
        Self::new(|_, duration_secs| Ok(short_series(duration_secs)))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SimulationEngine for MockEngine {
    fn solve(
        &self,
        params: &CellParameters,
        duration_secs: f64,
    ) -> Result<Vec<Sample>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.solve_fn)(params, duration_secs)
    }
}

/// Minimal plausible solver output covering `[0, duration_secs]`.
pub fn short_series(duration_secs: f64) -> Vec<Sample> {
    vec![
        Sample {
            time_s: 0.0,
            voltage_v: 3.95,
            current_a: 5.0,
            discharge_capacity_ah: 0.0,
        },
        Sample {
            time_s: duration_secs,
            voltage_v: 3.8,
            current_a: 5.0,
            discharge_capacity_ah: 5.0 * duration_secs / 3600.0,
        },
    ]
}

/// Blocking gate for holding a mock solve open until the test releases it.
///
/// `wait` blocks the (spawn_blocking) thread running the solve; `open`
/// releases every current and future waiter.
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            open: Mutex::new(false),
            cv: Condvar::new(),
        })
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome sink test doubles
// ---------------------------------------------------------------------------

/// Records every delivered outcome in memory.
pub struct RecordingSink {
    deliveries: tokio::sync::Mutex<Vec<(JobId, JobOutcome)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            deliveries: tokio::sync::Mutex::new(Vec::new()),
        })
    }

    pub async fn deliveries(&self) -> Vec<(JobId, JobOutcome)> {
        self.deliveries.lock().await.clone()
    }

    /// Poll until at least `n` outcomes have been delivered.
    ///
    /// Panics after ~5 s so a lost callback fails the test instead of
    /// hanging it.
    pub async fn wait_for(&self, n: usize) -> Vec<(JobId, JobOutcome)> {
        for _ in 0..100 {
            let deliveries = self.deliveries().await;
            if deliveries.len() >= n {
                return deliveries;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("Timed out waiting for {n} callback deliveries");
    }
}

#[async_trait::async_trait]
impl OutcomeSink for RecordingSink {
    async fn deliver(&self, job_id: &JobId, outcome: &JobOutcome) -> Result<(), CallbackError> {
        self.deliveries
            .lock()
            .await
            .push((job_id.clone(), outcome.clone()));
        Ok(())
    }
}

/// Sink whose every delivery fails, as if the retry budget were exhausted.
pub struct FailingSink;

#[async_trait::async_trait]
impl OutcomeSink for FailingSink {
    async fn deliver(&self, _job_id: &JobId, _outcome: &JobOutcome) -> Result<(), CallbackError> {
        Err(CallbackError::HttpStatus(503))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(
    engine: Arc<impl SimulationEngine + 'static>,
    sink: Arc<impl OutcomeSink + 'static>,
) -> (Router, Arc<JobOrchestrator>) {
    let orchestrator = JobOrchestrator::new(engine, sink, None);

    let state = AppState {
        orchestrator: Arc::clone(&orchestrator),
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(routes::router())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state);

    (app, orchestrator)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<axum::body::Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON POST request and return the raw response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> Response<axum::body::Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
