mod bbox;
mod dissolve;
mod segments;

pub(crate) use bbox::BoundingBox;
pub(crate) use dissolve::dissolve;
pub(crate) use segments::{multipolygon_segments, perimeter, signed_ring_area, QuantizedPoint, Segment};
