use std::sync::Arc;

use geo::MultiPolygon;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::{
    anneal::{AnnealConfig, AnnealReport, PhaseConfig, Progress},
    error::{PlanError, Result},
    geom,
    io,
    map::UnitGraph,
    objective::{Metric, Objective},
    partition::{EqualizeReport, MoveOutcome, Partition},
};

/// A districting plan: an assignment of every unit of a [`UnitGraph`] to one of N
/// contiguous districts, with per-district aggregates kept current on every move.
///
/// A fresh plan has every unit unassigned; call [`Plan::randomize`] or
/// [`Plan::set_assignments`] before optimizing.
#[derive(Clone, Debug)]
pub struct Plan {
    units: Arc<UnitGraph>,
    pub(super) partition: Partition,
    rng: StdRng,
}

impl Plan {
    /// Create an empty plan with `num_districts` districts, seeded from the OS.
    pub fn new(units: impl Into<Arc<UnitGraph>>, num_districts: u32) -> Result<Self> {
        Self::build(units.into(), num_districts, StdRng::from_os_rng())
    }

    /// Create an empty plan whose random choices are reproducible from `seed`.
    pub fn with_seed(units: impl Into<Arc<UnitGraph>>, num_districts: u32, seed: u64) -> Result<Self> {
        Self::build(units.into(), num_districts, StdRng::seed_from_u64(seed))
    }

    fn build(units: Arc<UnitGraph>, num_districts: u32, rng: StdRng) -> Result<Self> {
        if num_districts == 0 {
            return Err(PlanError::Construction("a plan needs at least one district".into()));
        }
        if num_districts as usize > units.len() {
            return Err(PlanError::Construction(format!(
                "{num_districts} districts requested for {} units", units.len()
            )));
        }
        let partition = Partition::new(num_districts as usize, Arc::clone(&units));
        Ok(Self { units, partition, rng })
    }

    #[inline] pub fn num_districts(&self) -> u32 { self.partition.num_districts() as u32 }

    #[inline] pub fn num_units(&self) -> usize { self.units.len() }

    /// The graph this plan partitions.
    #[inline] pub fn units(&self) -> &Arc<UnitGraph> { &self.units }

    /// Weight series available for metrics and totals.
    #[inline] pub fn series(&self) -> Vec<&str> { self.units.series() }

    /// District of every unit, in unit order.
    pub fn assignments(&self) -> Result<Vec<u32>> {
        if !self.partition.is_fully_assigned() { return Err(PlanError::Unassigned) }
        Ok(self.partition.assignments().iter().map(|&part| part as u32).collect())
    }

    /// Replace the whole assignment. The new assignment must cover every unit, use
    /// every district and keep each district contiguous; otherwise the plan is unchanged.
    pub fn set_assignments(&mut self, assignments: Vec<u32>) -> Result<()> {
        if assignments.len() != self.num_units() {
            return Err(PlanError::Construction(format!(
                "{} assignments for {} units", assignments.len(), self.num_units()
            )));
        }

        let num_districts = self.partition.num_districts();
        let mut sizes = vec![0usize; num_districts];
        for &district in &assignments {
            let district = district as usize;
            if district >= num_districts {
                return Err(PlanError::OutOfRange { what: "district", index: district, bound: num_districts });
            }
            sizes[district] += 1;
        }
        if let Some(empty) = sizes.iter().position(|&size| size == 0) {
            return Err(PlanError::Construction(format!("district {empty} has no units")));
        }

        let previous = self.partition.assignments().to_vec();
        let assignments = assignments.into_iter().map(|d| d as usize).collect::<Vec<_>>();
        self.partition.set_assignments(&assignments);

        if let Some(part) = (0..num_districts).find(|&part| !self.partition.part_is_connected(part)) {
            self.partition.set_assignments(&previous);
            return Err(PlanError::Construction(format!("district {part} is not contiguous")));
        }
        Ok(())
    }

    /// Whether every unit is assigned and every district is connected.
    #[inline] pub fn is_contiguous(&self) -> bool { self.partition.is_contiguous() }

    /// Sum of a series for each district.
    pub fn district_totals(&self, series: &str) -> Result<Vec<f64>> {
        self.partition.part_totals(series).ok_or_else(|| PlanError::UnknownSeries(series.to_string()))
    }

    /// Outer boundary length of each district.
    pub fn district_perimeters(&self) -> Vec<f64> {
        (0..self.partition.num_districts()).map(|part| self.partition.part_perimeter(part)).collect()
    }

    pub fn district_areas(&self) -> Vec<f64> {
        (0..self.partition.num_districts()).map(|part| self.partition.part_area(part)).collect()
    }

    /// Number of directed edges leaving `district` for another district.
    pub fn boundary_edge_count(&self, district: u32) -> Result<usize> {
        let part = self.check_district(district)?;
        Ok(self.partition.boundary_edge_count(part))
    }

    /// Move one unit to `district` if doing so keeps the plan valid.
    ///
    /// Infeasible moves are reported, never applied. Index errors are hard errors.
    pub fn propose_move(&mut self, unit: usize, district: u32) -> Result<MoveOutcome> {
        if unit >= self.num_units() {
            return Err(PlanError::OutOfRange { what: "unit", index: unit, bound: self.num_units() });
        }
        let part = self.check_district(district)?;
        if !self.partition.is_fully_assigned() { return Err(PlanError::Unassigned) }

        Ok(match self.partition.check_move(unit, part) {
            Ok(()) => {
                self.partition.move_node(unit, part);
                MoveOutcome::Applied
            }
            Err(reason) => MoveOutcome::Infeasible(reason),
        })
    }

    /// Per-district values of a metric.
    pub fn compute_metric(&self, metric: &Metric) -> Result<Vec<f64>> {
        self.check_metric(metric)?;
        Ok(metric.compute(&self.partition))
    }

    /// A metric reduced to one score (max for population deviation, mean otherwise).
    pub fn compute_metric_score(&self, metric: &Metric) -> Result<f64> {
        self.check_metric(metric)?;
        Ok(metric.compute_score(&self.partition))
    }

    /// Weighted sum of metric costs; lower is better.
    pub fn compute_objective(&self, objective: &Objective) -> Result<f64> {
        objective.validate()?;
        objective.validate_series(&self.units)?;
        Ok(objective.compute(&self.partition))
    }

    /// Randomly assign all units to contiguous districts grown from random seeds.
    pub fn randomize(&mut self) -> Result<()> {
        if !self.units.is_connected() {
            return Err(PlanError::Construction("cannot randomize: the unit graph is disconnected".into()));
        }
        if !self.partition.randomize(&mut self.rng) {
            return Err(PlanError::Construction("randomize left units unassigned".into()));
        }
        info!(districts = self.num_districts(), units = self.num_units(), "[Plan.randomize] assigned every unit");
        Ok(())
    }

    /// Greedily move boundary units between adjacent districts until every district
    /// total of `series` is within `tolerance` of the ideal.
    pub fn equalize(&mut self, series: &str, tolerance: f64, max_iter: usize) -> Result<EqualizeReport> {
        self.check_series(series)?;
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(PlanError::Config(format!("tolerance must be finite and non-negative, got {tolerance}")));
        }
        if !self.partition.is_fully_assigned() { return Err(PlanError::Unassigned) }

        let report = self.partition.equalize(series, tolerance, max_iter);
        info!(series, moves = report.moves, max_deviation = report.max_deviation, outcome = ?report.outcome, "[Plan.equalize] done");
        Ok(report)
    }

    /// Run multi-phase simulated annealing. The whole configuration is validated
    /// against this plan before any move; `progress` is called after every batch.
    pub fn anneal(&mut self, config: &AnnealConfig, progress: impl FnMut(&Progress)) -> Result<AnnealReport> {
        config.validate()?;
        for phase in &config.phases {
            phase.objective.validate_series(&self.units)?;
        }
        if !self.partition.is_fully_assigned() { return Err(PlanError::Unassigned) }

        Ok(match config.seed {
            Some(seed) => self.partition.anneal(config, &mut StdRng::seed_from_u64(seed), progress),
            None => self.partition.anneal(config, &mut self.rng, progress),
        })
    }

    /// Flat-argument form of [`Plan::anneal`]: one objective and one entry of each
    /// per-phase vector per phase. Phases are named `phase0`, `phase1`, ...
    #[allow(clippy::too_many_arguments)]
    pub fn anneal_phases(
        &mut self,
        objectives: Vec<Objective>,
        max_iter: usize,
        phase_start_probs: &[f64],
        phase_end_probs: &[Option<f64>],
        phase_cooling_rates: &[f64],
        init_temp: f64,
        early_stop_iters: Option<usize>,
        temp_search_batch_size: Option<usize>,
        batch_size: usize,
        progress: impl FnMut(&Progress),
    ) -> Result<AnnealReport> {
        let num_phases = objectives.len();
        for (name, len) in [
            ("phase_start_probs", phase_start_probs.len()),
            ("phase_end_probs", phase_end_probs.len()),
            ("phase_cooling_rates", phase_cooling_rates.len()),
        ] {
            if len != num_phases {
                return Err(PlanError::Config(format!("{name} has {len} entries for {num_phases} objectives")));
            }
        }

        let phases = objectives.into_iter().enumerate()
            .map(|(i, objective)| {
                let mut phase = PhaseConfig::new(format!("phase{i}"), objective, phase_start_probs[i], phase_end_probs[i]);
                phase.cooling_rate = phase_cooling_rates[i];
                phase
            })
            .collect();

        let config = AnnealConfig {
            init_temp,
            early_stop_iters,
            temp_search_batch_size,
            batch_size,
            ..AnnealConfig::new(phases, max_iter)
        };
        self.anneal(&config, progress)
    }

    /// Dissolved outline of every district, in district order.
    pub fn district_geometries(&self) -> Vec<(u32, MultiPolygon<f64>)> {
        let shapes = self.units.shapes();
        (0..self.partition.num_districts())
            .map(|part| {
                let members = self.partition.members(part).iter().map(|&unit| &shapes[unit]);
                (part as u32, geom::dissolve(members))
            })
            .collect()
    }

    /// District outlines as little-endian ISO WKB MultiPolygons.
    pub fn district_geometries_wkb(&self) -> Vec<(u32, Vec<u8>)> {
        self.district_geometries().iter()
            .map(|(district, shape)| (*district, io::wkb::multipolygon_to_wkb(shape)))
            .collect()
    }

    fn check_district(&self, district: u32) -> Result<usize> {
        let bound = self.partition.num_districts();
        if district as usize >= bound {
            return Err(PlanError::OutOfRange { what: "district", index: district as usize, bound });
        }
        Ok(district as usize)
    }

    fn check_series(&self, series: &str) -> Result<()> {
        if self.units.has_series(series) { Ok(()) } else { Err(PlanError::UnknownSeries(series.to_string())) }
    }

    fn check_metric(&self, metric: &Metric) -> Result<()> {
        metric.validate()?;
        metric.series().into_iter().try_for_each(|series| self.check_series(series))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use geo::{polygon, Area};

    use crate::{anneal::Stage, partition::Infeasible};

    use super::*;

    /// 2x3 grid of unit squares, population 1..=6 in row-major order.
    fn grid() -> Arc<UnitGraph> {
        let mut ids = Vec::new();
        let mut shapes = Vec::new();
        for r in 0..2 {
            for c in 0..3 {
                let (x, y) = (c as f64, r as f64);
                ids.push(format!("{r}-{c}"));
                shapes.push(MultiPolygon(vec![polygon![
                    (x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0)
                ]]));
            }
        }
        let weights = HashMap::from([("pop".to_string(), (1..=6).collect::<Vec<i64>>())]);
        Arc::new(UnitGraph::from_shapes(ids, shapes, weights, HashMap::new()).unwrap())
    }

    #[test]
    fn construction_checks_district_count() {
        assert!(matches!(Plan::new(grid(), 0), Err(PlanError::Construction(_))));
        assert!(matches!(Plan::new(grid(), 7), Err(PlanError::Construction(_))));
        assert!(Plan::new(grid(), 6).is_ok());
    }

    #[test]
    fn fresh_plan_is_unassigned() {
        let mut plan = Plan::with_seed(grid(), 2, 1).unwrap();
        assert_eq!(plan.assignments(), Err(PlanError::Unassigned));
        assert_eq!(plan.propose_move(0, 1), Err(PlanError::Unassigned));
        assert_eq!(plan.district_totals("pop").unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn set_assignments_validates() {
        let mut plan = Plan::with_seed(grid(), 2, 1).unwrap();
        assert!(matches!(plan.set_assignments(vec![0; 5]), Err(PlanError::Construction(_))));
        assert!(matches!(plan.set_assignments(vec![0, 0, 0, 2, 1, 1]), Err(PlanError::OutOfRange { .. })));
        assert!(matches!(plan.set_assignments(vec![0; 6]), Err(PlanError::Construction(_))));
        // district 1 split into two corners
        assert!(matches!(plan.set_assignments(vec![1, 0, 1, 0, 0, 0]), Err(PlanError::Construction(_))));
        assert_eq!(plan.assignments(), Err(PlanError::Unassigned));

        plan.set_assignments(vec![0, 0, 1, 0, 0, 1]).unwrap();
        assert_eq!(plan.assignments().unwrap(), vec![0, 0, 1, 0, 0, 1]);
        assert_eq!(plan.district_totals("pop").unwrap(), vec![12.0, 9.0]);
        assert!(plan.is_contiguous());
    }

    #[test]
    fn propose_move_checks_in_order() {
        let mut plan = Plan::with_seed(grid(), 2, 1).unwrap();
        plan.set_assignments(vec![0, 0, 1, 0, 0, 1]).unwrap();

        assert!(matches!(plan.propose_move(6, 0), Err(PlanError::OutOfRange { what: "unit", .. })));
        assert!(matches!(plan.propose_move(0, 2), Err(PlanError::OutOfRange { what: "district", .. })));
        assert_eq!(plan.propose_move(2, 1).unwrap(), MoveOutcome::Infeasible(Infeasible::SameDistrict));
        assert_eq!(plan.propose_move(0, 1).unwrap(), MoveOutcome::Infeasible(Infeasible::NotAdjacent));

        assert_eq!(plan.propose_move(1, 1).unwrap(), MoveOutcome::Applied);
        assert_eq!(plan.assignments().unwrap(), vec![0, 1, 1, 0, 0, 1]);
        assert_eq!(plan.district_totals("pop").unwrap(), vec![10.0, 11.0]);
        assert_eq!(plan.district_perimeters(), vec![8.0, 8.0]);
        assert_eq!(plan.district_areas(), vec![3.0, 3.0]);
    }

    #[test]
    fn metric_values_per_district() {
        let mut plan = Plan::with_seed(grid(), 2, 1).unwrap();
        plan.set_assignments(vec![0, 0, 1, 0, 0, 1]).unwrap();

        let metric = Metric::population_deviation("pop");
        let values = plan.compute_metric(&metric).unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|v| (v - 1.0 / 7.0).abs() < 1e-12));
        assert!((plan.compute_metric_score(&metric).unwrap() - 1.0 / 7.0).abs() < 1e-12);

        // 1x2 column: area 2, perimeter 6
        let polsby = plan.compute_metric(&Metric::compactness_polsby_popper()).unwrap();
        assert!((polsby[1] - 8.0 * std::f64::consts::PI / 36.0).abs() < 1e-9);

        assert_eq!(plan.compute_metric(&Metric::population_deviation("votes")), Err(PlanError::UnknownSeries("votes".into())));
    }

    #[test]
    fn unknown_series_is_rejected_before_work() {
        let mut plan = Plan::with_seed(grid(), 2, 1).unwrap();
        plan.randomize().unwrap();
        let before = plan.assignments().unwrap();

        assert_eq!(plan.equalize("votes", 0.1, 10), Err(PlanError::UnknownSeries("votes".into())));
        let objective = Objective::new(vec![Metric::population_deviation("votes")], None).unwrap();
        assert_eq!(plan.compute_objective(&objective), Err(PlanError::UnknownSeries("votes".into())));
        let config = AnnealConfig::single(objective, 0.9, Some(0.1), 0.9, 100);
        assert!(plan.anneal(&config, |_| {}).is_err());
        assert_eq!(plan.assignments().unwrap(), before);
    }

    #[test]
    fn anneal_phases_checks_lengths() {
        let mut plan = Plan::with_seed(grid(), 2, 1).unwrap();
        plan.randomize().unwrap();
        let objective = Objective::new(vec![Metric::population_deviation("pop")], None).unwrap();
        let result = plan.anneal_phases(vec![objective], 100, &[0.9], &[Some(0.1), None], &[0.9], 1.0, None, None, 10, |_| {});
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[test]
    fn anneal_phases_runs_and_reports() {
        let mut plan = Plan::with_seed(grid(), 2, 5).unwrap();
        plan.randomize().unwrap();
        let objective = Objective::new(vec![Metric::population_deviation("pop")], None).unwrap();

        let mut stages = Vec::new();
        let report = plan.anneal_phases(
            vec![objective], 2_000, &[0.5], &[Some(0.01)], &[0.9], 1.0, Some(500), Some(20), 20,
            |p| stages.push(p.stage),
        ).unwrap();

        assert!(report.iterations <= 2_000);
        assert_eq!(report.phases.len(), 1);
        assert_eq!(report.phases[0].name, "phase0");
        assert!(matches!(stages.first(), Some(Stage::Calibrating { phase: 0 })));
        assert!(plan.is_contiguous());
        assert_eq!(plan.district_totals("pop").unwrap().iter().sum::<f64>(), 21.0);
    }

    #[test]
    fn geometries_cover_the_grid() {
        let mut plan = Plan::with_seed(grid(), 3, 9).unwrap();
        plan.randomize().unwrap();
        let geometries = plan.district_geometries();
        assert_eq!(geometries.iter().map(|(d, _)| *d).collect::<Vec<_>>(), vec![0, 1, 2]);
        let area: f64 = geometries.iter().map(|(_, shape)| shape.unsigned_area()).sum();
        assert!((area - 6.0).abs() < 1e-9);

        let wkb = plan.district_geometries_wkb();
        assert_eq!(wkb.len(), 3);
        assert!(wkb.iter().all(|(_, bytes)| bytes[0] == 1));
    }

    #[test]
    fn plan_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Plan>();
    }
}
