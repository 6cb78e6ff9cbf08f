//! Domain types for the battery simulation service.
//!
//! Pure types only: the inbound request shape and its normalizer, the job
//! lifecycle state machine, solver output samples, and the error taxonomy.
//! No async, no I/O -- everything here is usable from both the HTTP layer
//! and the engine without pulling in either.

pub mod error;
pub mod job;
pub mod request;
pub mod series;
pub mod types;
