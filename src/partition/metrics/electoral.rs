use crate::partition::Partition;

impl Partition {
    /// Partisan lean of a district in [0, 0.5]: half the vote margin share.
    /// `None` when the district has no votes.
    fn partisan_lean(&self, part: usize, dem_series: &str, rep_series: &str) -> Option<f64> {
        let dem_votes = self.part_total(dem_series, part).unwrap_or(0.0);
        let rep_votes = self.part_total(rep_series, part).unwrap_or(0.0);
        let total_votes = dem_votes + rep_votes;
        if total_votes == 0.0 { return None }
        Some((dem_votes - rep_votes).abs() / (2.0 * total_votes))
    }

    // Get the competitiveness score for a part.
    // Formula: piecewise quadratic based on partisan lean and threshold
    pub(crate) fn competitiveness(&self, part: usize, dem_series: &str, rep_series: &str, threshold: f64) -> f64 {
        let Some(lean) = self.partisan_lean(part, dem_series, rep_series) else { return 0.0 };
        if lean <= threshold {
            1.0 - 2.0 / threshold * lean * lean
        } else {
            2.0 / (0.5 - threshold) * (0.5 - lean) * (0.5 - lean)
        }
    }

    // 1 inside the competitive band, 0 outside.
    pub(crate) fn competitiveness_binary(&self, part: usize, dem_series: &str, rep_series: &str, threshold: f64) -> f64 {
        match self.partisan_lean(part, dem_series, rep_series) {
            Some(lean) if lean <= threshold => 1.0,
            _ => 0.0,
        }
    }

    /// Democratic share of the two-party vote, or 0.5 when there are no votes.
    pub(crate) fn dem_share(&self, part: usize, dem_series: &str, rep_series: &str) -> f64 {
        let dem_votes = self.part_total(dem_series, part).unwrap_or(0.0);
        let total_votes = dem_votes + self.part_total(rep_series, part).unwrap_or(0.0);
        if total_votes == 0.0 { 0.5 } else { dem_votes / total_votes }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use geo::MultiPolygon;

    use crate::{map::UnitGraph, partition::Partition};

    fn votes(dem: Vec<i64>, rep: Vec<i64>) -> Partition {
        let n = dem.len();
        let units = UnitGraph::new(
            (0..n).map(|i| i.to_string()).collect(),
            vec![MultiPolygon(vec![]); n],
            (0..n).map(|_| vec![]).collect(),
            None,
            HashMap::from([("dem".to_string(), dem), ("rep".to_string(), rep)]),
            HashMap::new(),
        ).unwrap();
        let mut partition = Partition::new(n, Arc::new(units));
        partition.set_assignments(&(0..n).collect::<Vec<_>>());
        partition
    }

    #[test]
    fn competitiveness_piecewise_quadratic() {
        let partition = votes(vec![50, 60, 100, 0], vec![50, 40, 0, 0]);

        assert!((partition.competitiveness(0, "dem", "rep", 0.1) - 1.0).abs() < 1e-12);
        // lean 0.1 sits on the threshold
        assert!((partition.competitiveness(1, "dem", "rep", 0.1) - 0.8).abs() < 1e-12);
        assert!(partition.competitiveness(2, "dem", "rep", 0.1).abs() < 1e-12);
        assert_eq!(partition.competitiveness(3, "dem", "rep", 0.1), 0.0);
    }

    #[test]
    fn binary_and_share() {
        let partition = votes(vec![50, 60, 100, 0], vec![50, 40, 0, 0]);

        assert_eq!(partition.competitiveness_binary(1, "dem", "rep", 0.1), 1.0);
        assert_eq!(partition.competitiveness_binary(1, "dem", "rep", 0.05), 0.0);
        assert_eq!(partition.competitiveness_binary(3, "dem", "rep", 0.1), 0.0);
        assert!((partition.dem_share(1, "dem", "rep") - 0.6).abs() < 1e-12);
        assert_eq!(partition.dem_share(3, "dem", "rep"), 0.5);
    }
}
