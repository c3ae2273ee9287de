//! SVG format writing operations for visualization export.

mod color;
mod path;
mod writer;

pub(crate) use color::{golden_angle_color, partisan_color};
pub(crate) use path::{multipolygon_to_path, Projection};
pub(crate) use writer::SvgWriter;
