/// Job identifiers are opaque strings assigned by the job manager.
/// The orchestrator generates a UUID v4 when a request arrives without one.
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
