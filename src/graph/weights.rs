use std::collections::HashMap;

use ndarray::{Array2, Axis};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WeightType { I64, F64 }

/// Node weights stored as type-separated matrices, one row per node.
#[derive(Clone, Debug, Default)]
pub(crate) struct WeightMatrix {
    series: HashMap<String, (WeightType, usize)>, // len = k_i + k_f
    i64: Array2<i64>, // (n, k_i)
    f64: Array2<f64>, // (n, k_f)
}

impl WeightMatrix {
    /// Build a matrix with `num_rows` rows from named integer and float columns.
    /// Columns are laid out in sorted name order so layouts are reproducible.
    pub(crate) fn new(num_rows: usize,
        weights_i64: HashMap<String, Vec<i64>>,
        weights_f64: HashMap<String, Vec<f64>>,
    ) -> Self {
        let mut names_i64 = weights_i64.keys().cloned().collect::<Vec<_>>();
        let mut names_f64 = weights_f64.keys().cloned().collect::<Vec<_>>();
        names_i64.sort_unstable();
        names_f64.sort_unstable();

        let mut series = HashMap::with_capacity(names_i64.len() + names_f64.len());
        let mut ints = Array2::<i64>::zeros((num_rows, names_i64.len()));
        let mut floats = Array2::<f64>::zeros((num_rows, names_f64.len()));

        for (col, name) in names_i64.into_iter().enumerate() {
            let values = &weights_i64[&name];
            assert!(values.len() == num_rows, "series '{name}' has {} values, expected {num_rows}", values.len());
            values.iter().enumerate().for_each(|(row, &v)| ints[[row, col]] = v);
            series.insert(name, (WeightType::I64, col));
        }

        for (col, name) in names_f64.into_iter().enumerate() {
            let values = &weights_f64[&name];
            assert!(values.len() == num_rows, "series '{name}' has {} values, expected {num_rows}", values.len());
            values.iter().enumerate().for_each(|(row, &v)| floats[[row, col]] = v);
            assert!(!series.contains_key(&name), "series '{name}' defined as both i64 and f64");
            series.insert(name, (WeightType::F64, col));
        }

        Self { series, i64: ints, f64: floats }
    }

    /// A zeroed matrix with the same columns and `num_rows` rows.
    pub(crate) fn copy_of_size(&self, num_rows: usize) -> Self {
        Self {
            series: self.series.clone(),
            i64: Array2::zeros((num_rows, self.i64.ncols())),
            f64: Array2::zeros((num_rows, self.f64.ncols())),
        }
    }

    #[inline] pub(crate) fn num_rows(&self) -> usize { self.i64.nrows().max(self.f64.nrows()) }

    #[inline] pub(crate) fn contains(&self, series: &str) -> bool { self.series.contains_key(series) }

    /// Names of all series, sorted.
    pub(crate) fn series(&self) -> Vec<&str> {
        let mut names = self.series.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Read a single cell as f64, or `None` if the series is unknown.
    pub(crate) fn get_as_f64(&self, series: &str, row: usize) -> Option<f64> {
        match self.series.get(series)? {
            (WeightType::I64, col) => Some(self.i64[[row, *col]] as f64),
            (WeightType::F64, col) => Some(self.f64[[row, *col]]),
        }
    }

    /// Sum of a column over all rows.
    pub(crate) fn column_sum(&self, series: &str) -> Option<f64> {
        match self.series.get(series)? {
            (WeightType::I64, col) => Some(self.i64.column(*col).sum() as f64),
            (WeightType::F64, col) => Some(self.f64.column(*col).sum()),
        }
    }

    /// Add `other[other_row]` into `self[row]` for every series.
    pub(crate) fn add_row_from(&mut self, row: usize, other: &WeightMatrix, other_row: usize) {
        let mut ints = self.i64.row_mut(row);
        ints += &other.i64.row(other_row);
        let mut floats = self.f64.row_mut(row);
        floats += &other.f64.row(other_row);
    }

    /// Subtract `other[other_row]` from `self[row]` for every series.
    pub(crate) fn subtract_row_from(&mut self, row: usize, other: &WeightMatrix, other_row: usize) {
        let mut ints = self.i64.row_mut(row);
        ints -= &other.i64.row(other_row);
        let mut floats = self.f64.row_mut(row);
        floats -= &other.f64.row(other_row);
    }

    /// Overwrite `self[row]` with the column sums of `other`.
    pub(crate) fn set_row_to_sum_of(&mut self, row: usize, other: &WeightMatrix) {
        self.i64.row_mut(row).assign(&other.i64.sum_axis(Axis(0)));
        self.f64.row_mut(row).assign(&other.f64.sum_axis(Axis(0)));
    }

    /// Zero every row.
    pub(crate) fn clear_all_rows(&mut self) {
        self.i64.fill(0);
        self.f64.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_weights() -> WeightMatrix {
        WeightMatrix::new(
            3,
            HashMap::from([("pop".to_string(), vec![10, 20, 30])]),
            HashMap::from([("area".to_string(), vec![1.0, 0.5, 0.25])]),
        )
    }

    #[test]
    fn lookup_by_name_and_type() {
        let weights = make_weights();
        assert_eq!(weights.num_rows(), 3);
        assert_eq!(weights.get_as_f64("pop", 1), Some(20.0));
        assert_eq!(weights.get_as_f64("area", 2), Some(0.25));
        assert_eq!(weights.get_as_f64("missing", 0), None);
        assert_eq!(weights.series(), vec!["area", "pop"]);
        assert_eq!(weights.column_sum("pop"), Some(60.0));
    }

    #[test]
    fn row_arithmetic() {
        let units = make_weights();
        let mut parts = units.copy_of_size(2);
        assert_eq!(parts.get_as_f64("pop", 0), Some(0.0));

        parts.add_row_from(0, &units, 0);
        parts.add_row_from(0, &units, 2);
        parts.add_row_from(1, &units, 1);
        assert_eq!(parts.get_as_f64("pop", 0), Some(40.0));
        assert_eq!(parts.get_as_f64("area", 0), Some(1.25));

        parts.subtract_row_from(0, &units, 2);
        assert_eq!(parts.get_as_f64("pop", 0), Some(10.0));

        parts.set_row_to_sum_of(1, &units);
        assert_eq!(parts.get_as_f64("pop", 1), Some(60.0));
        assert_eq!(parts.get_as_f64("area", 1), Some(1.75));

        parts.clear_all_rows();
        assert_eq!(parts.get_as_f64("pop", 1), Some(0.0));
    }

    #[test]
    #[should_panic(expected = "expected 3")]
    fn rejects_short_columns() {
        WeightMatrix::new(3, HashMap::from([("pop".to_string(), vec![1, 2])]), HashMap::new());
    }
}
