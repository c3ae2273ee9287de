use std::path::Path;

use anyhow::{Context, Result};

use crate::{io::csv, plan::Plan};

impl Plan {
    /// Write a `geo_id,district` CSV with one row per unit.
    pub fn to_csv(&self, path: &Path) -> Result<()> {
        let assignments = self.assignments().context("[Plan.to_csv] Plan is not fully assigned")?;
        let mut df = csv::assignments_frame(self.units().geo_ids(), &assignments)?;
        csv::write_csv(&mut df, path)
    }

    /// The same CSV as [`Plan::to_csv`], as a string.
    pub fn to_csv_string(&self) -> Result<String> {
        let assignments = self.assignments().context("[Plan.to_csv_string] Plan is not fully assigned")?;
        let mut df = csv::assignments_frame(self.units().geo_ids(), &assignments)?;
        csv::write_csv_string(&mut df)
    }
}
