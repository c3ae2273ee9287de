use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{PlanError, Result},
    objective::Objective,
};

fn default_cooling_rate() -> f64 { 0.99 }
fn default_init_temp() -> f64 { 1.0 }
fn default_batch_size() -> usize { 1000 }
fn default_window_size() -> usize { 1000 }
fn default_calibration_tolerance() -> f64 { 0.01 }
fn default_max_calibration_rounds() -> usize { 50 }

/// One annealing phase: an objective plus its acceptance schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub name: String,
    pub objective: Objective,
    /// Acceptance probability the phase is calibrated to before cooling.
    pub start_prob: f64,
    /// The phase ends once the rolling acceptance rate falls to this value.
    #[serde(default)]
    pub end_prob: Option<f64>,
    /// Temperature multiplier applied after every batch, in (0, 1).
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,
    /// Overrides the run-wide stagnation limit for this phase.
    #[serde(default)]
    pub early_stop_iters: Option<usize>,
}

impl PhaseConfig {
    pub fn new(name: impl Into<String>, objective: Objective, start_prob: f64, end_prob: Option<f64>) -> Self {
        Self {
            name: name.into(),
            objective,
            start_prob,
            end_prob,
            cooling_rate: default_cooling_rate(),
            early_stop_iters: None,
        }
    }
}

/// Configuration of a multi-phase annealing run.
///
/// Reads the JSON run-config layout:
/// `{"max_iter": 100000, "phases": [{"name": "balance", "start_prob": 0.9, "end_prob": 0.05,
/// "objective": {"metrics": [...], "weights": [...]}}]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnealConfig {
    pub phases: Vec<PhaseConfig>,
    /// Total proposal budget across all phases, calibration included.
    pub max_iter: usize,
    #[serde(default = "default_init_temp")]
    pub init_temp: f64,
    /// Proposals without improving the best score before a phase (or run) stops.
    #[serde(default)]
    pub early_stop_iters: Option<usize>,
    /// Proposals per calibration batch; defaults to `batch_size`.
    #[serde(default)]
    pub temp_search_batch_size: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Number of recent proposals in the rolling acceptance rate.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_calibration_tolerance")]
    pub calibration_tolerance: f64,
    #[serde(default = "default_max_calibration_rounds")]
    pub max_calibration_rounds: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AnnealConfig {
    /// Run-wide defaults around the given phases.
    pub fn new(phases: Vec<PhaseConfig>, max_iter: usize) -> Self {
        Self {
            phases,
            max_iter,
            init_temp: default_init_temp(),
            early_stop_iters: None,
            temp_search_batch_size: None,
            batch_size: default_batch_size(),
            window_size: default_window_size(),
            calibration_tolerance: default_calibration_tolerance(),
            max_calibration_rounds: default_max_calibration_rounds(),
            seed: None,
        }
    }

    /// A single-phase run.
    pub fn single(objective: Objective, start_prob: f64, end_prob: Option<f64>, cooling_rate: f64, max_iter: usize) -> Self {
        let mut phase = PhaseConfig::new("anneal", objective, start_prob, end_prob);
        phase.cooling_rate = cooling_rate;
        Self::new(vec![phase], max_iter)
    }

    /// Parse and validate a JSON run config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlanError::Config(format!("[AnnealConfig::from_json_str] {e}")))?;
        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn temp_search_batch_size(&self) -> usize { self.temp_search_batch_size.unwrap_or(self.batch_size) }

    /// Stagnation limit for a phase, if any.
    #[inline]
    pub fn early_stop_for(&self, phase: usize) -> Option<usize> {
        self.phases.get(phase).and_then(|p| p.early_stop_iters).or(self.early_stop_iters)
    }

    /// Check every setting before any move runs.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(PlanError::Config(msg));

        if self.phases.is_empty() { return fail("at least one phase is required".into()) }
        if self.max_iter == 0 { return fail("max_iter must be positive".into()) }
        if !(self.init_temp.is_finite() && self.init_temp > 0.0) {
            return fail(format!("init_temp must be positive, got {}", self.init_temp));
        }
        if self.batch_size == 0 || self.temp_search_batch_size() == 0 || self.window_size == 0 {
            return fail("batch and window sizes must be positive".into());
        }
        if !(self.calibration_tolerance > 0.0 && self.calibration_tolerance < 1.0) {
            return fail(format!("calibration_tolerance must be in (0, 1), got {}", self.calibration_tolerance));
        }
        if self.max_calibration_rounds == 0 { return fail("max_calibration_rounds must be positive".into()) }

        let mut names = HashSet::new();
        for (i, phase) in self.phases.iter().enumerate() {
            let name = &phase.name;
            if !names.insert(name.as_str()) { return fail(format!("duplicate phase name '{name}'")) }
            if !(phase.start_prob > 0.0 && phase.start_prob < 1.0) {
                return fail(format!("phase '{name}': start_prob must be in (0, 1), got {}", phase.start_prob));
            }
            match phase.end_prob {
                Some(end) if !(end > 0.0 && end < phase.start_prob) => {
                    return fail(format!("phase '{name}': end_prob must be in (0, start_prob), got {end}"));
                }
                None if self.early_stop_for(i).is_none() => {
                    return fail(format!("phase '{name}': needs end_prob or early_stop_iters"));
                }
                _ => {}
            }
            if !(phase.cooling_rate > 0.0 && phase.cooling_rate < 1.0) {
                return fail(format!("phase '{name}': cooling_rate must be in (0, 1), got {}", phase.cooling_rate));
            }
            if self.early_stop_for(i) == Some(0) {
                return fail(format!("phase '{name}': early_stop_iters must be positive"));
            }
            phase.objective.validate().map_err(|e| PlanError::Config(format!("phase '{name}': {e}")))?;
        }
        Ok(())
    }
}
