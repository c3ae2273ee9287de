//! SVG writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

use super::Projection;

/// Thin wrapper around any byte sink; `write!` / `writeln!` work on it directly.
pub(crate) struct SvgWriter<W: Write> {
    writer: W,
}

impl<W: Write> Write for SvgWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter<BufWriter<File>> {
    /// Create a new SVG writer to a file path
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;
        Ok(Self { writer: BufWriter::new(file) })
    }
}

impl SvgWriter<Vec<u8>> {
    pub(crate) fn in_memory() -> Self { Self { writer: Vec::new() } }

    pub(crate) fn into_string(self) -> Result<String> {
        String::from_utf8(self.writer).context("[io::svg] SVG output is not valid UTF-8")
    }
}

impl<W: Write> SvgWriter<W> {
    /// Write the XML declaration, the opening <svg> tag and a white background.
    pub(crate) fn write_header(&mut self, projection: &Projection) -> Result<()> {
        let bounds = projection.bounds();
        writeln!(self, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
        writeln!(self, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width}" height="{height}"
        viewBox="0 0 {width} {height}"
        data-x-min="{x_min}" data-x-max="{x_max}"
        data-y-min="{y_min}" data-y-max="{y_max}"
        data-margin="{margin}" data-scale="{scale}">"##,
            width = projection.width(),
            height = projection.height(),
            x_min = bounds.min().x,
            x_max = bounds.max().x,
            y_min = bounds.min().y,
            y_max = bounds.max().y,
            margin = projection.margin(),
            scale = projection.scale(),
        )?;
        writeln!(self, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        Ok(())
    }

    /// Write SVG styles for map features.
    pub(crate) fn write_styles(&mut self) -> Result<()> {
        writeln!(self, r##"<defs>
<style>
    .unit {{ fill: none; stroke: #111827; stroke-opacity: 0.35; stroke-width: 0.3; }}
    .dist {{ stroke: #111827; stroke-width: 0.6; fill-opacity: 0.85; vector-effect: non-scaling-stroke; }}
</style>
</defs>"##)?;
        Ok(())
    }

    /// One filled district outline.
    pub(crate) fn write_district(&mut self, district: u32, fill: &str, path: &str) -> Result<()> {
        writeln!(self, r#"<path class="dist" data-district="{district}" fill-rule="evenodd" style="fill:{fill}" d="{path}"/>"#)?;
        Ok(())
    }

    /// One unfilled unit outline.
    pub(crate) fn write_unit(&mut self, path: &str) -> Result<()> {
        writeln!(self, r#"<path class="unit" d="{path}"/>"#)?;
        Ok(())
    }

    /// Write the closing </svg> tag and flush.
    pub(crate) fn write_footer(&mut self) -> Result<()> {
        writeln!(self, "</svg>")?;
        self.flush()?;
        Ok(())
    }
}
