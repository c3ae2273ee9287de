mod csv;
mod svg;
mod wkb;

pub use svg::SvgLayer;
