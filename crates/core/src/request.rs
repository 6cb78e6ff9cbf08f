//! Inbound request shape and parameter normalization.
//!
//! [`normalize`] maps the job manager's raw JSON body into a validated
//! [`SimulationRequest`], applying the historical defaults for any absent
//! field. It is a pure function: same input, same output, no side effects.
//! Chemistry-specific feasibility (whether the cutoff window is physically
//! reachable for the cell model) is deliberately NOT checked here -- that
//! is only discoverable by the engine at solve time.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::JobId;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default upper voltage cut-off [V].
pub const DEFAULT_UPPER_VOLTAGE_V: f64 = 4.2;

/// Default lower voltage cut-off [V].
pub const DEFAULT_LOWER_VOLTAGE_V: f64 = 2.5;

/// Default nominal cell capacity [A.h] (LGM50-class cell).
pub const DEFAULT_NOMINAL_CAPACITY_AH: f64 = 8.6;

/// Default fixed control current [A].
pub const DEFAULT_CONTROL_CURRENT_A: f64 = 5.0;

/// Default simulation duration [h].
pub const DEFAULT_DURATION_HOURS: f64 = 1.0;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Raw `POST /simulate` body as sent by the job manager.
///
/// Every field is optional; absent fields take the defaults above.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSimulationRequest {
    /// Job-manager-assigned identifier. May be absent or null.
    pub id: Option<JobId>,
    /// Simulation duration in hours.
    #[serde(rename = "time")]
    pub time_hours: Option<f64>,
    #[serde(rename = "upperVoltage")]
    pub upper_voltage: Option<f64>,
    #[serde(rename = "lowerVoltage")]
    pub lower_voltage: Option<f64>,
    #[serde(rename = "nominalCell")]
    pub nominal_cell: Option<f64>,
    #[serde(rename = "controlCurrent")]
    pub control_current: Option<f64>,
}

/// Validated, immutable simulation parameters.
///
/// Invariants (enforced by [`normalize`], relied upon by the engine):
/// `upper_voltage_cutoff_v > lower_voltage_cutoff_v > 0`,
/// `duration_hours > 0`, `nominal_capacity_ah > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub id: Option<JobId>,
    pub duration_hours: f64,
    pub upper_voltage_cutoff_v: f64,
    pub lower_voltage_cutoff_v: f64,
    pub nominal_capacity_ah: f64,
    pub control_current_a: f64,
}

impl SimulationRequest {
    /// Duration converted to seconds, the unit the engine solves in.
    pub fn duration_secs(&self) -> f64 {
        self.duration_hours * 3600.0
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Apply defaults and validate the structural invariants.
///
/// Returns `CoreError::Validation` on any violated invariant; a rejected
/// request must never be forwarded to the engine.
pub fn normalize(raw: RawSimulationRequest) -> Result<SimulationRequest, CoreError> {
    let request = SimulationRequest {
        id: raw.id,
        duration_hours: raw.time_hours.unwrap_or(DEFAULT_DURATION_HOURS),
        upper_voltage_cutoff_v: raw.upper_voltage.unwrap_or(DEFAULT_UPPER_VOLTAGE_V),
        lower_voltage_cutoff_v: raw.lower_voltage.unwrap_or(DEFAULT_LOWER_VOLTAGE_V),
        nominal_capacity_ah: raw.nominal_cell.unwrap_or(DEFAULT_NOMINAL_CAPACITY_AH),
        control_current_a: raw.control_current.unwrap_or(DEFAULT_CONTROL_CURRENT_A),
    };

    if !(request.duration_hours > 0.0) {
        return Err(CoreError::Validation(format!(
            "Simulation duration must be positive, got {} h",
            request.duration_hours
        )));
    }
    if !(request.nominal_capacity_ah > 0.0) {
        return Err(CoreError::Validation(format!(
            "Nominal cell capacity must be positive, got {} A.h",
            request.nominal_capacity_ah
        )));
    }
    if !(request.lower_voltage_cutoff_v > 0.0) {
        return Err(CoreError::Validation(format!(
            "Lower voltage cut-off must be positive, got {} V",
            request.lower_voltage_cutoff_v
        )));
    }
    if request.upper_voltage_cutoff_v <= request.lower_voltage_cutoff_v {
        return Err(CoreError::Validation(format!(
            "Upper voltage cut-off ({} V) must be greater than the lower cut-off ({} V)",
            request.upper_voltage_cutoff_v, request.lower_voltage_cutoff_v
        )));
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_request_takes_all_defaults() {
        let request = normalize(RawSimulationRequest::default()).unwrap();

        assert_eq!(request.id, None);
        assert_eq!(request.duration_hours, DEFAULT_DURATION_HOURS);
        assert_eq!(request.upper_voltage_cutoff_v, DEFAULT_UPPER_VOLTAGE_V);
        assert_eq!(request.lower_voltage_cutoff_v, DEFAULT_LOWER_VOLTAGE_V);
        assert_eq!(request.nominal_capacity_ah, DEFAULT_NOMINAL_CAPACITY_AH);
        assert_eq!(request.control_current_a, DEFAULT_CONTROL_CURRENT_A);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let raw = RawSimulationRequest {
            id: Some("J1".into()),
            time_hours: Some(2.0),
            upper_voltage: Some(4.1),
            lower_voltage: Some(3.0),
            nominal_cell: Some(5.0),
            control_current: Some(2.0),
        };

        let request = normalize(raw).unwrap();
        assert_eq!(request.id.as_deref(), Some("J1"));
        assert_eq!(request.duration_hours, 2.0);
        assert_eq!(request.upper_voltage_cutoff_v, 4.1);
        assert_eq!(request.lower_voltage_cutoff_v, 3.0);
        assert_eq!(request.nominal_capacity_ah, 5.0);
        assert_eq!(request.control_current_a, 2.0);
    }

    #[test]
    fn normalize_is_deterministic() {
        let raw = RawSimulationRequest {
            id: Some("J1".into()),
            time_hours: Some(1.5),
            ..Default::default()
        };

        let first = normalize(raw.clone()).unwrap();
        let second = normalize(raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn inverted_cutoffs_are_rejected() {
        let raw = RawSimulationRequest {
            upper_voltage: Some(2.0),
            lower_voltage: Some(4.2),
            ..Default::default()
        };

        let err = normalize(raw).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) => {
            assert!(msg.contains("cut-off"), "unexpected message: {msg}");
        });
    }

    #[test]
    fn equal_cutoffs_are_rejected() {
        let raw = RawSimulationRequest {
            upper_voltage: Some(3.5),
            lower_voltage: Some(3.5),
            ..Default::default()
        };

        assert_matches!(normalize(raw), Err(CoreError::Validation(_)));
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        for bad in [0.0, -1.0] {
            let raw = RawSimulationRequest {
                time_hours: Some(bad),
                ..Default::default()
            };
            assert_matches!(normalize(raw), Err(CoreError::Validation(_)));
        }
    }

    #[test]
    fn non_positive_capacity_is_rejected() {
        let raw = RawSimulationRequest {
            nominal_cell: Some(0.0),
            ..Default::default()
        };
        assert_matches!(normalize(raw), Err(CoreError::Validation(_)));
    }

    #[test]
    fn non_positive_lower_cutoff_is_rejected() {
        let raw = RawSimulationRequest {
            lower_voltage: Some(-0.5),
            ..Default::default()
        };
        assert_matches!(normalize(raw), Err(CoreError::Validation(_)));
    }

    #[test]
    fn raw_request_parses_job_manager_field_names() {
        let raw: RawSimulationRequest = serde_json::from_str(
            r#"{
                "id": "J1",
                "time": 1,
                "upperVoltage": 4.2,
                "lowerVoltage": 2.5,
                "nominalCell": 8.6,
                "controlCurrent": 5
            }"#,
        )
        .unwrap();

        assert_eq!(raw.id.as_deref(), Some("J1"));
        assert_eq!(raw.time_hours, Some(1.0));
        assert_eq!(raw.upper_voltage, Some(4.2));
        assert_eq!(raw.lower_voltage, Some(2.5));
        assert_eq!(raw.nominal_cell, Some(8.6));
        assert_eq!(raw.control_current, Some(5.0));
    }

    #[test]
    fn duration_converts_to_seconds() {
        let request = normalize(RawSimulationRequest {
            time_hours: Some(1.5),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(request.duration_secs(), 5400.0);
    }
}
