use geo::{Coord, LineString, MultiPolygon};

/// Quantization scale (1e-7 deg ≈ 1 cm at equator). Adjust if your data is projected.
pub(crate) const Q_SCALE: f64 = 1e7;

/// A coordinate snapped to the quantization grid, usable as a hash key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(crate) struct QuantizedPoint(pub(crate) i64, pub(crate) i64);

impl QuantizedPoint {
    #[inline]
    pub(crate) fn new(c: &Coord<f64>) -> Self {
        Self((c.x * Q_SCALE).round() as i64, (c.y * Q_SCALE).round() as i64)
    }
}

/// A directed segment between two quantized points.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(crate) struct Segment(pub(crate) QuantizedPoint, pub(crate) QuantizedPoint);

impl Segment {
    #[inline] pub(crate) fn reversed(self) -> Self { Segment(self.1, self.0) }

    /// Canonical (min, max) endpoint order, identifying the segment regardless of direction.
    #[inline]
    pub(crate) fn undirected(self) -> Self {
        if self.0 <= self.1 { self } else { self.reversed() }
    }
}

/// Iterate the non-degenerate directed segments of a closed ring, with their
/// original endpoints.
pub(crate) fn ring_segments(ring: &LineString<f64>) -> impl Iterator<Item = (Segment, Coord<f64>, Coord<f64>)> + '_ {
    ring.lines().filter_map(|line| {
        let segment = Segment(QuantizedPoint::new(&line.start), QuantizedPoint::new(&line.end));
        (segment.0 != segment.1).then_some((segment, line.start, line.end))
    })
}

/// Iterate every directed segment of every ring of a MultiPolygon.
pub(crate) fn multipolygon_segments(shape: &MultiPolygon<f64>) -> impl Iterator<Item = (Segment, Coord<f64>, Coord<f64>)> + '_ {
    shape.0.iter().flat_map(|polygon| {
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .flat_map(ring_segments)
    })
}

/// Total boundary length of a MultiPolygon (exteriors and holes).
pub(crate) fn perimeter(shape: &MultiPolygon<f64>) -> f64 {
    shape.0.iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .flat_map(|ring| ring.lines())
        .map(|line| line.dx().hypot(line.dy()))
        .sum()
}

/// Signed shoelace area of a closed coordinate ring (positive when counter-clockwise).
pub(crate) fn signed_ring_area(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 { return 0.0 }
    let twice = ring.iter().zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>();
    twice / 2.0
}
