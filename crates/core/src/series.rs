//! Solver output samples in the job manager's wire format.

use serde::{Deserialize, Serialize};

/// One electrical measurement per solver time step.
///
/// Serialized field names (`time`, `voltage`, `current`, `dcap`) are the
/// shape the job manager already parses; do not rename them without
/// coordinating a job-manager change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Elapsed simulation time [s], non-decreasing across a series.
    #[serde(rename = "time")]
    pub time_s: f64,
    /// Terminal voltage [V].
    #[serde(rename = "voltage")]
    pub voltage_v: f64,
    /// Discharge current [A].
    #[serde(rename = "current")]
    pub current_a: f64,
    /// Cumulative discharge capacity [A.h].
    #[serde(rename = "dcap")]
    pub discharge_capacity_ah: f64,
}
