use crate::partition::Partition;

impl Partition {
    /// Signed relative deviation of every district from the ideal share of `series`.
    /// A map with no population has no deviation.
    pub(crate) fn population_deviations(&self, series: &str) -> Vec<f64> {
        let ideal = self.region_total(series).unwrap_or(0.0) / self.num_districts() as f64;
        if ideal == 0.0 { return vec![0.0; self.num_districts()] }
        (0..self.num_districts())
            .map(|part| self.part_total(series, part).unwrap_or(0.0) / ideal - 1.0)
            .collect()
    }

    /// Largest absolute deviation over all districts.
    pub(crate) fn max_population_deviation(&self, series: &str) -> f64 {
        self.population_deviations(series).into_iter().map(f64::abs).fold(0.0, f64::max)
    }
}
