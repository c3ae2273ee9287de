use std::collections::VecDeque;

use rand::Rng;
use tracing::{info, warn};

use crate::{
    anneal::{AnnealConfig, AnnealReport, PhaseConfig, PhaseReport, Progress, Stage, StopReason},
    objective::Objective,
    partition::Partition,
};

/// Epsilon threshold for treating small deltas as improvements (handles floating point precision).
const EPSILON: f64 = 1e-10;

/// Calculate acceptance probability for a move with given delta and temperature.
/// Returns 1.0 if delta <= 0 (within epsilon), otherwise exp(-delta/temp).
fn acceptance_probability(delta: f64, temp: f64) -> f64 {
    if delta <= EPSILON { 1.0 } else { (-delta / temp).exp() }
}

/// Mutable bookkeeping of a run, shared by every phase.
struct AnnealState {
    iteration: usize,
    temperature: f64,
    current_score: f64,
    best_score: f64,
    best_assignments: Vec<usize>,
    best_iter: usize,
    last_improvement: usize,
    window: VecDeque<f64>,
    window_sum: f64,
    window_size: usize,
    last_prob: f64,
    last_delta: f64,
}

impl AnnealState {
    fn push_probability(&mut self, prob: f64) {
        self.window.push_back(prob);
        self.window_sum += prob;
        if self.window.len() > self.window_size {
            self.window_sum -= self.window.pop_front().unwrap_or(0.0);
        }
    }

    /// Mean acceptance probability over the rolling window (0 if nothing was feasible).
    fn rolling_rate(&self) -> f64 {
        if self.window.is_empty() { 0.0 } else { self.window_sum / self.window.len() as f64 }
    }
}

/// Acceptance statistics of one batch of proposals.
#[derive(Default)]
struct Batch {
    proposals: usize,
    feasible: usize,
    prob_sum: f64,
}

impl Batch {
    fn rate(&self) -> f64 {
        if self.feasible == 0 { 0.0 } else { self.prob_sum / self.feasible as f64 }
    }
}

/// How a single proposal ended.
enum Step {
    Accepted { prob: f64 },
    Rejected { prob: f64 },
    Infeasible,
    NoCandidates,
}

impl Partition {
    /// Pick a uniformly random boundary node of any district, and a uniformly random
    /// district it borders.
    fn random_boundary_move(&self, rng: &mut impl Rng) -> Option<(usize, usize)> {
        let districts = 0..self.num_districts();
        let count = self.frontiers.count_in(districts.clone());
        if count == 0 { return None }

        let node = self.frontiers.nth_in(districts, rng.random_range(0..count))?;
        let part = self.random_neighboring_part(node, rng)?;
        Some((node, part))
    }

    /// Propose one move and accept or revert it with the Metropolis criterion.
    fn anneal_step(&mut self, objective: &Objective, state: &mut AnnealState, report: &mut AnnealReport, rng: &mut impl Rng) -> Step {
        let Some((node, part)) = self.random_boundary_move(rng) else { return Step::NoCandidates };
        state.iteration += 1;

        if self.check_move(node, part).is_err() {
            report.rejected_topology += 1;
            return Step::Infeasible;
        }

        let prev = self.assignment(node);
        self.move_node(node, part);
        let score = objective.compute(self);
        let delta = score - state.current_score;
        let prob = acceptance_probability(delta, state.temperature);
        state.last_delta = delta;
        state.last_prob = prob;
        state.push_probability(prob);

        if prob >= 1.0 || rng.random::<f64>() < prob {
            state.current_score = score;
            report.accepted += 1;
            Step::Accepted { prob }
        } else {
            self.move_node(node, prev);
            report.rejected_objective += 1;
            Step::Rejected { prob }
        }
    }

    /// Run up to `size` proposals without exceeding `max_iter`.
    /// Returns `None` when there is nothing left to propose.
    fn anneal_batch(&mut self, objective: &Objective, size: usize, max_iter: usize,
        state: &mut AnnealState, report: &mut AnnealReport, rng: &mut impl Rng,
    ) -> Option<Batch> {
        let mut batch = Batch::default();
        while batch.proposals < size && state.iteration < max_iter {
            batch.proposals += 1;
            match self.anneal_step(objective, state, report, rng) {
                Step::Accepted { prob } | Step::Rejected { prob } => {
                    batch.feasible += 1;
                    batch.prob_sum += prob;
                }
                Step::Infeasible => {}
                Step::NoCandidates => return None,
            }
        }

        // Snapshot the best state seen at batch granularity.
        if state.current_score < state.best_score {
            state.best_score = state.current_score;
            state.best_iter = state.iteration;
            state.last_improvement = state.iteration;
            state.best_assignments.copy_from_slice(self.assignments());
        }
        Some(batch)
    }

    fn anneal_progress(&self, objective: &Objective, stage: Stage, state: &AnnealState, acceptance_rate: f64) -> Progress {
        Progress {
            stage,
            iteration: state.iteration,
            objective: state.current_score,
            metrics: objective.metrics().iter()
                .map(|metric| (metric.short_name().to_string(), metric.compute_score(self)))
                .collect(),
            best_score: state.best_score,
            best_iter: state.best_iter,
            temperature: state.temperature,
            acceptance_rate,
            current_prob: state.last_prob,
            delta: state.last_delta,
        }
    }

    /// Search for the temperature whose acceptance rate is within tolerance of the phase's
    /// `start_prob`: expand by 10x until the target is bracketed, then bisect in log space.
    /// Returns whether the target was reached, or the reason the run must stop.
    fn calibrate_temperature(&mut self, config: &AnnealConfig, index: usize,
        state: &mut AnnealState, report: &mut AnnealReport, rng: &mut impl Rng,
        progress: &mut impl FnMut(&Progress),
    ) -> Result<bool, StopReason> {
        let phase = &config.phases[index];
        let target = phase.start_prob;
        let (mut low, mut high) = (None::<f64>, None::<f64>);
        let (mut closest_temp, mut closest_err) = (state.temperature, f64::INFINITY);

        for _ in 0..config.max_calibration_rounds {
            if state.iteration >= config.max_iter { return Err(StopReason::MaxIterations) }
            let batch = self.anneal_batch(&phase.objective, config.temp_search_batch_size(), config.max_iter, state, report, rng)
                .ok_or(StopReason::NoCandidateMoves)?;

            let rate = batch.rate();
            progress(&self.anneal_progress(&phase.objective, Stage::Calibrating { phase: index }, state, rate));

            let err = (rate - target).abs();
            if err < closest_err { (closest_temp, closest_err) = (state.temperature, err) }
            if err <= config.calibration_tolerance { return Ok(true) }

            if rate < target { low = Some(state.temperature) } else { high = Some(state.temperature) }
            state.temperature = match (low, high) {
                (Some(low), Some(high)) => (low * high).sqrt(),
                (Some(low), None) => low * 10.0,
                (None, Some(high)) => high / 10.0,
                (None, None) => state.temperature,
            };
        }

        state.temperature = closest_temp;
        let message = format!(
            "phase '{}': acceptance rate did not reach {} within {} calibration rounds; using temperature {:e}",
            phase.name, target, config.max_calibration_rounds, closest_temp,
        );
        warn!("[anneal] {message}");
        report.warnings.push(message);
        Ok(false)
    }

    /// Cool one phase until its acceptance rate falls to `end_prob`, it stagnates, or the
    /// run budget is spent. Returns the reason the whole run must stop, if any.
    fn cool_phase(&mut self, config: &AnnealConfig, index: usize,
        state: &mut AnnealState, report: &mut AnnealReport, rng: &mut impl Rng,
        progress: &mut impl FnMut(&Progress),
    ) -> Option<StopReason> {
        let phase: &PhaseConfig = &config.phases[index];
        let early_stop = config.early_stop_for(index);

        loop {
            if state.iteration >= config.max_iter { return Some(StopReason::MaxIterations) }
            if self.anneal_batch(&phase.objective, config.batch_size, config.max_iter, state, report, rng).is_none() {
                return Some(StopReason::NoCandidateMoves);
            }
            state.temperature *= phase.cooling_rate;

            let rate = state.rolling_rate();
            progress(&self.anneal_progress(&phase.objective, Stage::Cooling { phase: index }, state, rate));

            if phase.end_prob.is_some_and(|end| rate <= end) { return None }
            if early_stop.is_some_and(|limit| state.iteration - state.last_improvement >= limit) {
                return phase.end_prob.map(|_| StopReason::EarlyStop);
            }
        }
    }

    /// Run simulated annealing through every phase of `config`.
    ///
    /// Each phase re-scores the current plan under its own objective, calibrates the
    /// temperature to the phase's starting acceptance probability, then cools. At the
    /// end of each phase the plan is restored to the best state that phase saw, so the
    /// plan returned is the best seen under the final phase's objective.
    ///
    /// The best score never rises while the objective stays the same. When a phase
    /// switches objective, its best starts over from the plan it inherits.
    pub(crate) fn anneal(&mut self, config: &AnnealConfig, rng: &mut impl Rng, mut progress: impl FnMut(&Progress)) -> AnnealReport {
        assert!(self.is_fully_assigned(), "every node must be assigned before annealing");

        let mut report = AnnealReport::new(StopReason::AllPhasesDone);
        let mut state = AnnealState {
            iteration: 0,
            temperature: config.init_temp,
            current_score: 0.0,
            best_score: f64::INFINITY,
            best_assignments: self.assignments().to_vec(),
            best_iter: 0,
            last_improvement: 0,
            window: VecDeque::with_capacity(config.window_size + 1),
            window_sum: 0.0,
            window_size: config.window_size,
            last_prob: 1.0,
            last_delta: 0.0,
        };

        for (index, phase) in config.phases.iter().enumerate() {
            info!(phase = %phase.name, iteration = state.iteration, "[anneal] starting phase");
            let start_iter = state.iteration;
            state.current_score = phase.objective.compute(self);
            state.last_improvement = state.iteration;

            // A phase scored like the one before it keeps that phase's best; any other
            // objective starts its best from the plan as it stands.
            let same_objective = index > 0 && config.phases[index - 1].objective == phase.objective;
            if !same_objective {
                state.best_score = state.current_score;
                state.best_iter = state.iteration;
                state.best_assignments.copy_from_slice(self.assignments());
            }
            state.window.clear();
            state.window_sum = 0.0;

            let mut calibrated = false;
            let start_temperature;
            let stop = match self.calibrate_temperature(config, index, &mut state, &mut report, rng, &mut progress) {
                Ok(reached) => {
                    calibrated = reached;
                    start_temperature = state.temperature;
                    self.cool_phase(config, index, &mut state, &mut report, rng, &mut progress)
                }
                Err(reason) => {
                    start_temperature = state.temperature;
                    Some(reason)
                }
            };

            // Leave the phase at its best state.
            if state.current_score > state.best_score {
                self.set_assignments(&state.best_assignments);
                state.current_score = state.best_score;
            }

            report.phases.push(PhaseReport {
                name: phase.name.clone(),
                start_temperature,
                end_temperature: state.temperature,
                iterations: state.iteration - start_iter,
                best_score: state.best_score,
                best_iter: state.best_iter,
                calibrated,
            });

            let stage = match stop {
                Some(reason) => Stage::Finished(reason),
                None => Stage::PhaseDone { phase: index },
            };
            let rate = state.rolling_rate();
            progress(&self.anneal_progress(&phase.objective, stage, &state, rate));
            info!(phase = %phase.name, best = state.best_score, iterations = state.iteration - start_iter, "[anneal] phase done");

            if let Some(reason) = stop {
                report.stop_reason = reason;
                break;
            }
        }

        report.iterations = state.iteration;
        report.best_score = state.best_score;
        report.best_iter = state.best_iter;
        report.final_temperature = state.temperature;
        info!(
            iterations = report.iterations,
            accepted = report.accepted,
            best = report.best_score,
            stop = ?report.stop_reason,
            "[anneal] finished",
        );
        report
    }
}
