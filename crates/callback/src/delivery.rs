//! HTTP callback delivery with exponential-backoff retry.
//!
//! [`CallbackDispatcher`] serializes a [`JobOutcome`] into the job
//! manager's expected JSON shape and POSTs it to the configured callback
//! URL. Failed attempts are retried up to three times with exponential
//! backoff (1 s, 2 s, 4 s) before the failure is reported to the caller.

use std::time::Duration;

use battsim_core::job::JobOutcome;
use battsim_core::types::JobId;

use crate::OutcomeSink;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for callback delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The job manager returned a non-2xx status code.
    #[error("Callback endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Serialize an outcome into the job manager's callback body.
///
/// Success: `{ "id": ..., "result": [samples...] }`.
/// Failure: `{ "id": ..., "error": { "kind": ..., "message": ... } }`.
pub fn callback_payload(job_id: &JobId, outcome: &JobOutcome) -> serde_json::Value {
    match outcome {
        JobOutcome::Succeeded(samples) => serde_json::json!({
            "id": job_id,
            "result": samples,
        }),
        JobOutcome::Failed(info) => serde_json::json!({
            "id": job_id,
            "error": info,
        }),
    }
}

// ---------------------------------------------------------------------------
// CallbackDispatcher
// ---------------------------------------------------------------------------

/// Delivers job outcomes to the job manager's callback endpoint.
///
/// The callback URL is process-wide configuration fixed at startup; it is
/// never chosen per request.
pub struct CallbackDispatcher {
    client: reqwest::Client,
    callback_url: String,
}

impl CallbackDispatcher {
    /// Create a new dispatcher with a pre-configured HTTP client.
    pub fn new(callback_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            callback_url,
        }
    }

    /// The configured callback URL.
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), CallbackError> {
        let response = self
            .client
            .post(&self.callback_url)
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CallbackError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl OutcomeSink for CallbackDispatcher {
    /// Deliver an outcome with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt.
    async fn deliver(&self, job_id: &JobId, outcome: &JobOutcome) -> Result<(), CallbackError> {
        let payload = callback_payload(job_id, outcome);

        let mut last_err: Option<CallbackError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        job_id = %job_id,
                        attempt = attempt + 1,
                        url = %self.callback_url,
                        error = %e,
                        "Callback delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(&payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(
                    job_id = %job_id,
                    url = %self.callback_url,
                    error = %e,
                    "Callback delivery failed after all retries"
                );
                Err(last_err.unwrap_or(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
