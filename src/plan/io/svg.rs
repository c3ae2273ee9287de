use std::{io::Write, path::Path};

use anyhow::{anyhow, bail, Result};

use crate::{
    io::svg::{golden_angle_color, multipolygon_to_path, partisan_color, Projection, SvgWriter},
    plan::Plan,
};

/// Extra content drawn on a district map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SvgLayer {
    /// Overlay the outline of every unit.
    Units,
    /// Fill districts by partisan lean instead of distinct colors.
    Partisan { dem_series: String, rep_series: String },
}

impl Plan {
    /// Small wrapper with defaults.
    pub fn to_svg(&self, path: &Path, layer: Option<&SvgLayer>) -> Result<()> {
        self.to_svg_with_size(path, layer, 1200.0, 10.0)
    }

    /// Draw dissolved districts, one `<path>` each (holes via even-odd fill).
    pub fn to_svg_with_size(&self, path: &Path, layer: Option<&SvgLayer>, width: f64, margin: f64) -> Result<()> {
        let mut writer = SvgWriter::create(path)?;
        self.render_svg(&mut writer, layer, width, margin)
    }

    /// Same drawing as [`Plan::to_svg`], returned as a string.
    pub fn to_svg_string(&self, layer: Option<&SvgLayer>) -> Result<String> {
        let mut writer = SvgWriter::in_memory();
        self.render_svg(&mut writer, layer, 1200.0, 10.0)?;
        writer.into_string()
    }

    fn render_svg<W: Write>(&self, writer: &mut SvgWriter<W>, layer: Option<&SvgLayer>, width: f64, margin: f64) -> Result<()> {
        if let Some(SvgLayer::Partisan { dem_series, rep_series }) = layer {
            for series in [dem_series, rep_series] {
                if !self.units().has_series(series) { bail!("[Plan.to_svg] Missing series '{series}'") }
            }
        }
        let bounds = self.units().bounds()
            .ok_or_else(|| anyhow!("[Plan.to_svg] Could not determine bounds; nothing to draw."))?;
        let projection = Projection::new(bounds, width, margin);

        writer.write_header(&projection)?;
        writer.write_styles()?;

        for (district, shape) in self.district_geometries() {
            if shape.0.is_empty() { continue }
            let fill = match layer {
                Some(SvgLayer::Partisan { dem_series, rep_series }) => {
                    let share = self.partition.dem_share(district as usize, dem_series, rep_series);
                    partisan_color(2.0 * share - 1.0).to_string()
                }
                _ => golden_angle_color(district as usize).to_string(),
            };
            writer.write_district(district, &fill, &multipolygon_to_path(&shape, &projection))?;
        }

        if let Some(SvgLayer::Units) = layer {
            for shape in self.units().shapes() {
                writer.write_unit(&multipolygon_to_path(shape, &projection))?;
            }
        }

        writer.write_footer()
    }
}
