use serde::Serialize;

use crate::anneal::StopReason;

/// Outcome of one phase.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseReport {
    pub name: String,
    /// Temperature the calibration settled on.
    pub start_temperature: f64,
    pub end_temperature: f64,
    /// Proposals spent in this phase, calibration included.
    pub iterations: usize,
    pub best_score: f64,
    /// Global iteration at which the phase's best score was first reached.
    pub best_iter: usize,
    pub calibrated: bool,
}

/// Outcome of a full annealing run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnealReport {
    pub iterations: usize,
    pub accepted: usize,
    /// Feasible proposals turned down by the Metropolis test.
    pub rejected_objective: usize,
    /// Proposals that would have broken contiguity or emptied a district.
    pub rejected_topology: usize,
    /// Best objective of the final phase, which is the state the plan is left in.
    pub best_score: f64,
    pub best_iter: usize,
    pub final_temperature: f64,
    pub stop_reason: StopReason,
    pub phases: Vec<PhaseReport>,
    pub warnings: Vec<String>,
}

impl AnnealReport {
    pub(crate) fn new(stop_reason: StopReason) -> Self {
        Self {
            iterations: 0,
            accepted: 0,
            rejected_objective: 0,
            rejected_topology: 0,
            best_score: f64::INFINITY,
            best_iter: 0,
            final_temperature: 0.0,
            stop_reason,
            phases: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Fraction of feasible proposals that were accepted.
    pub fn acceptance_ratio(&self) -> f64 {
        let feasible = self.accepted + self.rejected_objective;
        if feasible == 0 { 0.0 } else { self.accepted as f64 / feasible as f64 }
    }
}
