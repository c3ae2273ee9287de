use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::error::PlanError;

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    AllPhasesDone,
    MaxIterations,
    /// A phase with an acceptance target went `early_stop_iters` proposals without improving.
    EarlyStop,
    /// There is no boundary unit to move (fewer than two districts).
    NoCandidateMoves,
}

/// Position of the annealer in its phase schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Calibrating { phase: usize },
    Cooling { phase: usize },
    PhaseDone { phase: usize },
    Finished(StopReason),
}

/// Snapshot handed to the progress callback after every batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Progress {
    pub stage: Stage,
    pub iteration: usize,
    pub objective: f64,
    /// Score of every metric in the active objective, by short name.
    pub metrics: Vec<(String, f64)>,
    /// Best score under the active phase's objective. Carried over from the previous
    /// phase when both share an objective.
    pub best_score: f64,
    pub best_iter: usize,
    pub temperature: f64,
    /// Mean acceptance probability over the rolling window.
    pub acceptance_rate: f64,
    /// Acceptance probability of the last proposal.
    pub current_prob: f64,
    pub delta: f64,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metrics = self.metrics.iter()
            .map(|(name, score)| format!("{name}={score:.4}"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "Iter {}: obj {:.12e} | {} | best {:.12e} @ {} | temp {:.12e} | prob {:.8} | curr_prob {:.8} | delta {:.8e}",
            self.iteration,
            self.objective,
            metrics,
            self.best_score,
            self.best_iter,
            self.temperature,
            self.acceptance_rate,
            self.current_prob,
            self.delta,
        )
    }
}

/// A progress line read back from a log.
///
/// Older lines lack `delta`, the `@ iter` of the best score, or `curr_prob`;
/// those fields are then `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressRecord {
    pub iteration: usize,
    pub objective: f64,
    pub metrics: Vec<(String, f64)>,
    pub best_score: f64,
    pub best_iter: Option<usize>,
    pub temperature: f64,
    pub acceptance_rate: f64,
    pub current_prob: Option<f64>,
    pub delta: Option<f64>,
}

const NUM: &str = r"([-+\d.eE]+|NaN|inf|-inf)";

static LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!(
    r"Iter (\d+): obj {NUM} \| (.*?) ?\| best {NUM}(?: @ (\d+))? \| temp {NUM} \| prob {NUM}(?: \| curr_prob {NUM})?(?: \| delta {NUM})?\s*$"
)).unwrap_or_else(|e| panic!("progress line pattern: {e}")));

static METRIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!(r"(\w+)={NUM}"))
    .unwrap_or_else(|e| panic!("metric pattern: {e}")));

impl FromStr for ProgressRecord {
    type Err = PlanError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let bad = || PlanError::Config(format!("not a progress line: '{line}'"));
        let caps = LINE.captures(line).ok_or_else(bad)?;
        let float = |i: usize| caps.get(i).map(|m| m.as_str().parse::<f64>()).transpose().map_err(|_| bad());

        let metrics = METRIC.captures_iter(&caps[3])
            .map(|m| Ok((m[1].to_string(), m[2].parse::<f64>().map_err(|_| bad())?)))
            .collect::<Result<Vec<_>, PlanError>>()?;

        Ok(Self {
            iteration: caps[1].parse::<usize>().map_err(|_| bad())?,
            objective: float(2)?.ok_or_else(bad)?,
            metrics,
            best_score: float(4)?.ok_or_else(bad)?,
            best_iter: caps.get(5).map(|m| m.as_str().parse::<usize>()).transpose().map_err(|_| bad())?,
            temperature: float(6)?.ok_or_else(bad)?,
            acceptance_rate: float(7)?.ok_or_else(bad)?,
            current_prob: float(8)?,
            delta: float(9)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> Progress {
        Progress {
            stage: Stage::Cooling { phase: 0 },
            iteration: 1200,
            objective: 0.125,
            metrics: vec![("PopulationDeviation".into(), 0.0125), ("CompactnessPolsbyPopper".into(), 0.31)],
            best_score: 0.0625,
            best_iter: 900,
            temperature: 0.5,
            acceptance_rate: 0.25,
            current_prob: 1.0,
            delta: -0.001,
        }
    }

    #[test]
    fn display_matches_log_format() {
        assert_eq!(progress().to_string(),
            "Iter 1200: obj 1.250000000000e-1 | PopulationDeviation=0.0125 CompactnessPolsbyPopper=0.3100 \
             | best 6.250000000000e-2 @ 900 | temp 5.000000000000e-1 | prob 0.25000000 | curr_prob 1.00000000 \
             | delta -1.00000000e-3");
    }

    #[test]
    fn parses_current_format() {
        let record: ProgressRecord = progress().to_string().parse().unwrap();
        assert_eq!(record.iteration, 1200);
        assert_eq!(record.objective, 0.125);
        assert_eq!(record.metrics, vec![("PopulationDeviation".into(), 0.0125), ("CompactnessPolsbyPopper".into(), 0.31)]);
        assert_eq!(record.best_iter, Some(900));
        assert_eq!(record.current_prob, Some(1.0));
        assert_eq!(record.delta, Some(-0.001));
    }

    #[test]
    fn parses_older_formats() {
        let record: ProgressRecord = "Iter 5: obj 0.5000 | PopulationDeviation=0.5000 | best 0.4000 | temp 1.000000000000e0 | prob 0.90000000"
            .parse().unwrap();
        assert_eq!(record.best_score, 0.4);
        assert_eq!(record.best_iter, None);
        assert_eq!(record.current_prob, None);
        assert_eq!(record.delta, None);

        let record: ProgressRecord = "Iter 6: obj 0.5 | x=1.0 | best 0.4 | temp 1e0 | prob 0.9 | curr_prob 0.5"
            .parse().unwrap();
        assert_eq!(record.current_prob, Some(0.5));
        assert_eq!(record.delta, None);
    }

    #[test]
    fn rejects_other_lines() {
        assert!("phase 'balance' calibrated".parse::<ProgressRecord>().is_err());
    }
}
