use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::{PlanError, Result}, partition::Partition};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum MetricKind {
    // Demographic metrics:
    PopulationDeviation {
        #[serde(rename = "series")]
        pop_series: String,
    },
    PopulationDeviationSmooth {
        #[serde(rename = "series")]
        pop_series: String,
    },

    // Geometric metrics:
    CompactnessPolsbyPopper,
    CompactnessSchwartzberg,

    // Electoral metrics:
    Competitiveness { dem_series: String, rep_series: String, threshold: f64 },
    CompetitivenessBinary { dem_series: String, rep_series: String, threshold: f64 },
}

/// A single metric used in a multi-objective optimization.
/// This does *not* carry a weight; weights live in `Objective`.
///
/// Serialized as a tagged object, e.g. `{"kind": "population_deviation", "series": "pop"}`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metric {
    kind: MetricKind,
}

impl Metric {
    /// Largest absolute relative deviation of any district from the ideal population.
    pub fn population_deviation(pop_series: impl Into<String>) -> Self {
        Self { kind: MetricKind::PopulationDeviation { pop_series: pop_series.into() } }
    }

    /// Mean squared relative deviation from the ideal population.
    pub fn population_deviation_smooth(pop_series: impl Into<String>) -> Self {
        Self { kind: MetricKind::PopulationDeviationSmooth { pop_series: pop_series.into() } }
    }

    /// Polsby–Popper compactness metric.
    pub fn compactness_polsby_popper() -> Self {
        Self { kind: MetricKind::CompactnessPolsbyPopper }
    }

    /// Schwartzberg compactness metric.
    pub fn compactness_schwartzberg() -> Self {
        Self { kind: MetricKind::CompactnessSchwartzberg }
    }

    /// Competitiveness metric based on district-level vote shares (piecewise quadratic).
    /// `threshold` is the partisan lean, in (0, 0.5), below which a district counts as competitive.
    pub fn competitiveness(dem_series: impl Into<String>, rep_series: impl Into<String>, threshold: f64) -> Self {
        Self { kind: MetricKind::Competitiveness {
            dem_series: dem_series.into(), rep_series: rep_series.into(), threshold,
        } }
    }

    /// Competitiveness metric based on district-level vote shares (binary).
    pub fn competitiveness_binary(dem_series: impl Into<String>, rep_series: impl Into<String>, threshold: f64) -> Self {
        Self { kind: MetricKind::CompetitivenessBinary {
            dem_series: dem_series.into(), rep_series: rep_series.into(), threshold,
        } }
    }

    /// Get a short name for this metric (for display purposes).
    pub fn short_name(&self) -> &'static str {
        match &self.kind {
            MetricKind::PopulationDeviation { .. } => "PopulationDeviation",
            MetricKind::PopulationDeviationSmooth { .. } => "PopulationDeviationSmooth",
            MetricKind::CompactnessPolsbyPopper => "CompactnessPolsbyPopper",
            MetricKind::CompactnessSchwartzberg => "CompactnessSchwartzberg",
            MetricKind::Competitiveness { .. } => "Competitiveness",
            MetricKind::CompetitivenessBinary { .. } => "CompetitivenessBinary",
        }
    }

    /// Whether a higher score is better.
    pub fn is_maximized(&self) -> bool {
        !matches!(self.kind, MetricKind::PopulationDeviation { .. } | MetricKind::PopulationDeviationSmooth { .. })
    }

    /// Weight series this metric reads.
    pub fn series(&self) -> Vec<&str> {
        match &self.kind {
            MetricKind::PopulationDeviation { pop_series }
            | MetricKind::PopulationDeviationSmooth { pop_series } => vec![pop_series.as_str()],
            MetricKind::CompactnessPolsbyPopper
            | MetricKind::CompactnessSchwartzberg => vec![],
            MetricKind::Competitiveness { dem_series, rep_series, .. }
            | MetricKind::CompetitivenessBinary { dem_series, rep_series, .. } => vec![dem_series.as_str(), rep_series.as_str()],
        }
    }

    /// Check parameters that do not depend on a map.
    pub(crate) fn validate(&self) -> Result<()> {
        match &self.kind {
            MetricKind::Competitiveness { threshold, .. }
            | MetricKind::CompetitivenessBinary { threshold, .. } if !(*threshold > 0.0 && *threshold < 0.5) => {
                Err(PlanError::Config(format!("{self}: threshold must be in (0, 0.5)")))
            }
            _ => Ok(()),
        }
    }

    /// Evaluate this metric for a given partition, returning per-district values.
    pub(crate) fn compute(&self, partition: &Partition) -> Vec<f64> {
        let districts = 0..partition.num_districts();
        match &self.kind {
            MetricKind::PopulationDeviation { pop_series } => {
                partition.population_deviations(pop_series).into_iter().map(f64::abs).collect()
            }
            MetricKind::PopulationDeviationSmooth { pop_series } => {
                partition.population_deviations(pop_series).into_iter().map(|d| d.powi(2)).collect()
            }
            MetricKind::CompactnessPolsbyPopper => {
                districts.map(|part| partition.polsby_popper(part)).collect()
            }
            MetricKind::CompactnessSchwartzberg => {
                districts.map(|part| partition.schwartzberg(part)).collect()
            }
            MetricKind::Competitiveness { dem_series, rep_series, threshold } => {
                districts.map(|part| partition.competitiveness(part, dem_series, rep_series, *threshold)).collect()
            }
            MetricKind::CompetitivenessBinary { dem_series, rep_series, threshold } => {
                districts.map(|part| partition.competitiveness_binary(part, dem_series, rep_series, *threshold)).collect()
            }
        }
    }

    /// Reduce per-district values to a single score: the maximum for population
    /// deviation, the mean for everything else.
    pub(crate) fn compute_score(&self, partition: &Partition) -> f64 {
        let values = self.compute(partition);
        if values.is_empty() { return 0.0 }
        match &self.kind {
            MetricKind::PopulationDeviation { .. } => values.into_iter().fold(0.0, f64::max),
            _ => values.iter().sum::<f64>() / values.len() as f64,
        }
    }

    /// Score as a cost to minimize: maximized metrics are flipped to `1 - score`.
    pub(crate) fn compute_cost(&self, partition: &Partition) -> f64 {
        let score = self.compute_score(partition);
        if self.is_maximized() { 1.0 - score } else { score }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            MetricKind::PopulationDeviation { pop_series } =>
                write!(f, "PopulationDeviation(series='{}')", pop_series),
            MetricKind::PopulationDeviationSmooth { pop_series } =>
                write!(f, "PopulationDeviationSmooth(series='{}')", pop_series),
            MetricKind::CompactnessPolsbyPopper =>
                write!(f, "CompactnessPolsbyPopper"),
            MetricKind::CompactnessSchwartzberg =>
                write!(f, "CompactnessSchwartzberg"),
            MetricKind::Competitiveness { dem_series, rep_series, threshold } =>
                write!(f, "Competitiveness(dem_series='{}', rep_series='{}', threshold={})",
                    dem_series, rep_series, threshold),
            MetricKind::CompetitivenessBinary { dem_series, rep_series, threshold } =>
                write!(f, "CompetitivenessBinary(dem_series='{}', rep_series='{}', threshold={})",
                    dem_series, rep_series, threshold),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metric({})", self.kind)
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use geo::{polygon, MultiPolygon};

    use crate::map::UnitGraph;

    use super::*;

    /// Two unit squares side by side with populations 30 / 10 and votes.
    fn pair() -> Partition {
        let shapes = (0..2).map(|i| {
            let x = i as f64;
            MultiPolygon(vec![polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]])
        }).collect();
        let units = UnitGraph::from_shapes(
            vec!["a".into(), "b".into()],
            shapes,
            HashMap::from([
                ("pop".to_string(), vec![30, 10]),
                ("dem".to_string(), vec![50, 70]),
                ("rep".to_string(), vec![50, 30]),
            ]),
            HashMap::new(),
        ).unwrap();
        let mut partition = Partition::new(2, Arc::new(units));
        partition.set_assignments(&[0, 1]);
        partition
    }

    #[test]
    fn population_reductions() {
        let partition = pair();
        let deviation = Metric::population_deviation("pop");
        assert_eq!(deviation.compute(&partition), vec![0.5, 0.5]);
        assert_eq!(deviation.compute_score(&partition), 0.5);
        assert_eq!(deviation.compute_cost(&partition), 0.5);

        let smooth = Metric::population_deviation_smooth("pop");
        assert!((smooth.compute_score(&partition) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn maximized_metrics_flip_to_cost() {
        let partition = pair();
        let pp = Metric::compactness_polsby_popper();
        let score = pp.compute_score(&partition);
        assert!((score - std::f64::consts::PI / 4.0).abs() < 1e-9);
        assert!((pp.compute_cost(&partition) - (1.0 - score)).abs() < 1e-12);

        let competitive = Metric::competitiveness_binary("dem", "rep", 0.1);
        assert_eq!(competitive.compute(&partition), vec![1.0, 0.0]);
        assert_eq!(competitive.compute_cost(&partition), 0.5);
    }

    #[test]
    fn series_and_validation() {
        let metric = Metric::competitiveness("dem", "rep", 0.1);
        assert_eq!(metric.series(), vec!["dem", "rep"]);
        assert!(metric.validate().is_ok());
        assert!(Metric::compactness_schwartzberg().series().is_empty());
        assert!(matches!(Metric::competitiveness("dem", "rep", 0.5).validate(), Err(PlanError::Config(_))));
    }

    #[test]
    fn serde_uses_tagged_layout() {
        let metric: Metric = serde_json::from_str(r#"{"kind": "population_deviation", "series": "pop"}"#).unwrap();
        assert_eq!(metric, Metric::population_deviation("pop"));
        assert_eq!(metric.to_string(), "Metric(PopulationDeviation(series='pop'))");

        let json = serde_json::to_value(Metric::compactness_polsby_popper()).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "compactness_polsby_popper"}));
    }
}
