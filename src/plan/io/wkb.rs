use std::path::Path;

use anyhow::{Context, Result};
use geo::MultiPolygon;

use crate::{io::wkb, plan::Plan};

impl Plan {
    /// Write every district outline into one WKB bundle file.
    pub fn write_district_wkb(&self, path: &Path, compress: bool) -> Result<()> {
        let bytes = wkb::write_district_bundle(&self.district_geometries_wkb(), compress)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("[Plan.write_district_wkb] Failed to write {}", path.display()))
    }

    /// Read a bundle written by [`Plan::write_district_wkb`].
    pub fn read_district_wkb(path: &Path) -> Result<Vec<(u32, MultiPolygon<f64>)>> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("[Plan.read_district_wkb] Failed to read {}", path.display()))?;
        wkb::read_district_bundle(&bytes)?.into_iter()
            .map(|(district, blob)| {
                let shape = wkb::read_multipolygon_wkb(&blob)
                    .with_context(|| format!("[Plan.read_district_wkb] Bad geometry for district {district}"))?;
                Ok((district, shape))
            })
            .collect()
    }
}
