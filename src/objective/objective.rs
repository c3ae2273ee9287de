//! Multi-objective scalarization: a set of metrics plus a set of weights.
//!
//! This is the "objective" as seen by search algorithms such as simulated
//! annealing. It is deliberately simple: a weighted sum of metric costs,
//! where lower is better.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{PlanError, Result},
    map::UnitGraph,
    objective::Metric,
    partition::Partition,
};

/// A multi-objective scalarization: metrics + corresponding weights.
///
/// ```text
/// total_cost = sum_i weights[i] * cost_i(plan)
/// ```
///
/// A weight of 0 keeps a metric tracked (it still appears in progress lines)
/// without steering the search.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    metrics: Vec<Metric>,
    weights: Vec<f64>,
}

impl Objective {
    /// Construct a new Objective from a list of metrics and an optional
    /// list of weights.
    ///
    /// If `weights` is `None`, all metrics default to weight 1.0.
    /// If `Some`, the length must match `metrics.len()`.
    pub fn new(metrics: Vec<Metric>, weights: Option<Vec<f64>>) -> Result<Self> {
        let weights = weights.unwrap_or_else(|| vec![1.0; metrics.len()]);
        let objective = Self { metrics, weights };
        objective.validate()?;
        Ok(objective)
    }

    /// Number of metric terms in this objective.
    #[inline] pub fn num_metrics(&self) -> usize { self.metrics.len() }

    /// Accessor for weights vector.
    #[inline] pub fn weights(&self) -> &[f64] { &self.weights }

    #[inline] pub fn metrics(&self) -> &[Metric] { &self.metrics }

    /// Replace the current weights with a new vector (length must match num_metrics).
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        let previous = std::mem::replace(&mut self.weights, weights);
        if let Err(err) = self.validate() {
            self.weights = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Check the objective on its own: at least one metric, one finite
    /// non-negative weight per metric, and valid metric parameters.
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(PlanError::Config("objective needs at least one metric".into()));
        }
        if self.weights.len() != self.metrics.len() {
            return Err(PlanError::Config(format!(
                "weights length ({}) must match metrics length ({})", self.weights.len(), self.metrics.len()
            )));
        }
        if let Some(weight) = self.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(PlanError::Config(format!("weight {weight} must be finite and non-negative")));
        }
        self.metrics.iter().try_for_each(Metric::validate)
    }

    /// Check that every series the metrics read exists on `units`.
    pub(crate) fn validate_series(&self, units: &UnitGraph) -> Result<()> {
        for series in self.metrics.iter().flat_map(Metric::series) {
            if !units.has_series(series) { return Err(PlanError::UnknownSeries(series.to_string())) }
        }
        Ok(())
    }

    /// Evaluate this objective for a given partition: the weighted sum of metric costs.
    pub(crate) fn compute(&self, partition: &Partition) -> f64 {
        self.metrics.iter().zip(&self.weights)
            .map(|(metric, &weight)| weight * metric.compute_cost(partition))
            .sum()
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Objective {{")?;
        for (i, (metric, weight)) in self.metrics.iter().zip(&self.weights).enumerate() {
            writeln!(f, "  {:2}: {} * weight={}", i, metric, weight)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
