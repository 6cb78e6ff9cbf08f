//! Engine-facing cell parameters.

use battsim_core::request::SimulationRequest;

/// Cell parameters consumed by a [`SimulationEngine`](crate::SimulationEngine).
///
/// A positive control current discharges the cell; a negative one charges it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParameters {
    pub upper_voltage_cutoff_v: f64,
    pub lower_voltage_cutoff_v: f64,
    pub nominal_capacity_ah: f64,
    pub control_current_a: f64,
}

impl From<&SimulationRequest> for CellParameters {
    fn from(request: &SimulationRequest) -> Self {
        Self {
            upper_voltage_cutoff_v: request.upper_voltage_cutoff_v,
            lower_voltage_cutoff_v: request.lower_voltage_cutoff_v,
            nominal_capacity_ah: request.nominal_capacity_ah,
            control_current_a: request.control_current_a,
        }
    }
}
