//! Built-in single-cell equivalent-circuit solver.
//!
//! [`SingleCellSolver`] integrates a constant-current discharge (or charge)
//! of one lithium-ion cell with an empirical open-circuit-voltage curve
//! fitted to an LGM50-class cell and a fixed ohmic internal resistance.
//! Fixed-step forward integration with coulomb counting; the run ends at
//! the requested duration or at the first voltage cut-off crossing,
//! whichever comes first. The crossing sample is placed on the cut-off by
//! linear interpolation so no reported voltage leaves the window.

use battsim_core::series::Sample;

use crate::parameters::CellParameters;
use crate::{EngineError, SimulationEngine};

// ---------------------------------------------------------------------------
// Cell model constants
// ---------------------------------------------------------------------------

/// Open-circuit voltage at zero state of charge, before the knee term [V].
const OCV_FLOOR_V: f64 = 3.0;

/// Linear OCV rise from empty to full [V].
const OCV_SPAN_V: f64 = 1.2;

/// Depth of the low-charge voltage knee [V].
const KNEE_DEPTH_V: f64 = 0.7;

/// Steepness of the low-charge knee (dimensionless, applied to SOC).
const KNEE_STEEPNESS: f64 = 20.0;

/// Default ohmic internal resistance [Ohm].
const DEFAULT_INTERNAL_RESISTANCE_OHM: f64 = 0.05;

/// Default maximum C-rate the fixed-step integration stays stable at.
const DEFAULT_MAX_C_RATE: f64 = 10.0;

/// Upper bound on integration steps for a single solve.
const MAX_STEPS: usize = 3600;

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Constant-current single-cell solver.
///
/// Reentrant: `solve` reads configuration only, so concurrent calls from
/// different jobs share nothing mutable.
#[derive(Debug, Clone)]
pub struct SingleCellSolver {
    internal_resistance_ohm: f64,
    max_c_rate: f64,
}

impl Default for SingleCellSolver {
    fn default() -> Self {
        Self {
            internal_resistance_ohm: DEFAULT_INTERNAL_RESISTANCE_OHM,
            max_c_rate: DEFAULT_MAX_C_RATE,
        }
    }
}

impl SingleCellSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open-circuit voltage as a function of state of charge.
    ///
    /// Linear slope plus an exponential knee that collapses the voltage as
    /// the cell approaches empty.
    fn ocv(&self, soc: f64) -> f64 {
        OCV_FLOOR_V + OCV_SPAN_V * soc - KNEE_DEPTH_V * (-KNEE_STEEPNESS * soc).exp()
    }

    /// Terminal voltage under load: OCV minus the ohmic drop.
    fn terminal_voltage(&self, soc: f64, current_a: f64) -> f64 {
        self.ocv(soc) - current_a * self.internal_resistance_ohm
    }

    /// Sample placed on a cut-off crossing between two integration points.
    fn crossing_sample(
        cutoff_v: f64,
        t_prev: f64,
        v_prev: f64,
        t_next: f64,
        v_next: f64,
        current_a: f64,
        dcap_prev: f64,
    ) -> Sample {
        let frac = (cutoff_v - v_prev) / (v_next - v_prev);
        let dt = (t_next - t_prev) * frac;
        Sample {
            time_s: t_prev + dt,
            voltage_v: cutoff_v,
            current_a,
            discharge_capacity_ah: dcap_prev + current_a * dt / 3600.0,
        }
    }
}

impl SimulationEngine for SingleCellSolver {
    fn solve(
        &self,
        params: &CellParameters,
        duration_secs: f64,
    ) -> Result<Vec<Sample>, EngineError> {
        let current = params.control_current_a;
        let capacity = params.nominal_capacity_ah;

        let c_rate = (current / capacity).abs();
        if c_rate > self.max_c_rate {
            return Err(EngineError::Solver(format!(
                "Corrector convergence failed: C-rate {c_rate:.2} exceeds the stable \
                 integration limit of {:.1}",
                self.max_c_rate
            )));
        }

        // Feasibility of the cut-off window at the initial condition. The
        // classic symptom of a bad window: cut-offs should sit around the
        // 2.5 V .. 4.2 V range of this chemistry.
        let v0 = self.terminal_voltage(1.0, current);
        if v0 <= params.lower_voltage_cutoff_v {
            return Err(EngineError::Solver(format!(
                "Voltage cut-off values should be relative to 2.5 V and 4.2 V: terminal \
                 voltage {v0:.3} V is already below the lower cut-off {:.3} V at t = 0",
                params.lower_voltage_cutoff_v
            )));
        }
        if v0 > params.upper_voltage_cutoff_v {
            return Err(EngineError::Solver(format!(
                "Voltage cut-off values should be relative to 2.5 V and 4.2 V: terminal \
                 voltage {v0:.3} V is above the upper cut-off {:.3} V at t = 0",
                params.upper_voltage_cutoff_v
            )));
        }

        let steps = (duration_secs.ceil() as usize).clamp(1, MAX_STEPS);
        let dt = duration_secs / steps as f64;

        tracing::debug!(
            current_a = current,
            capacity_ah = capacity,
            duration_secs,
            steps,
            "Starting single-cell solve",
        );

        let mut soc: f64 = 1.0;
        let mut dcap = 0.0;
        let mut v_prev = v0;

        let mut samples = Vec::with_capacity(steps + 1);
        samples.push(Sample {
            time_s: 0.0,
            voltage_v: v0,
            current_a: current,
            discharge_capacity_ah: 0.0,
        });

        for step in 1..=steps {
            // Pin the final step to the exact duration to avoid accumulated
            // floating-point drift past the requested end time.
            let t = if step == steps {
                duration_secs
            } else {
                step as f64 * dt
            };
            let t_prev = (step - 1) as f64 * dt;

            soc -= current * dt / 3600.0 / capacity;
            let dcap_prev = dcap;
            dcap += current * dt / 3600.0;

            let v = self.terminal_voltage(soc, current);
            if !v.is_finite() {
                return Err(EngineError::Solver(format!(
                    "Corrector convergence failed at t = {t:.3} s: non-finite voltage"
                )));
            }

            if v <= params.lower_voltage_cutoff_v {
                samples.push(Self::crossing_sample(
                    params.lower_voltage_cutoff_v,
                    t_prev,
                    v_prev,
                    t,
                    v,
                    current,
                    dcap_prev,
                ));
                tracing::debug!(t, "Lower voltage cut-off reached, stopping early");
                break;
            }
            if v >= params.upper_voltage_cutoff_v {
                samples.push(Self::crossing_sample(
                    params.upper_voltage_cutoff_v,
                    t_prev,
                    v_prev,
                    t,
                    v,
                    current,
                    dcap_prev,
                ));
                tracing::debug!(t, "Upper voltage cut-off reached, stopping early");
                break;
            }

            samples.push(Sample {
                time_s: t,
                voltage_v: v,
                current_a: current,
                discharge_capacity_ah: dcap,
            });
            v_prev = v;
        }

        Ok(samples)
    }
}
