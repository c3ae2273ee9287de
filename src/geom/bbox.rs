use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a ring or shape by index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl BoundingBox {
    /// Bounding box of a coordinate sequence, or `None` if it is empty.
    pub(crate) fn of_coords(idx: usize, coords: &[Coord<f64>]) -> Option<Self> {
        let first = coords.first()?;
        let (min, max) = coords.iter().fold((*first, *first), |(min, max), c| (
            Coord { x: min.x.min(c.x), y: min.y.min(c.y) },
            Coord { x: max.x.max(c.x), y: max.y.max(c.y) },
        ));
        Some(Self { idx, bbox: Rect::new(min, max) })
    }

    /// Get the index of the corresponding ring or shape.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }

    /// Envelope in the form rstar queries take.
    #[inline]
    pub(crate) fn aabb(&self) -> AABB<[f64; 2]> {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.aabb() }
}
