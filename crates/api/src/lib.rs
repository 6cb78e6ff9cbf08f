//! Battery simulation API server library.
//!
//! Exposes the building blocks (config, state, error handling, the job
//! orchestrator, routes) so integration tests and the binary entrypoint
//! can both access them.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod routes;
pub mod state;
