//! Projection and path-data helpers.

use geo::{CoordsIter, LineString, MultiPolygon, Rect};

/// Maps map coordinates onto an SVG canvas of fixed width, Y pointing down.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Projection {
    bounds: Rect<f64>,
    margin: f64,
    scale: f64,
    width: f64,
    height: f64,
}

impl Projection {
    pub(crate) fn new(bounds: Rect<f64>, width: f64, margin: f64) -> Self {
        let extent = bounds.width().max(bounds.height());
        let scale = if extent > 0.0 { (width - 2.0 * margin) / extent } else { 1.0 };
        let height = bounds.height() * scale + 2.0 * margin;
        Self { bounds, margin, scale, width, height }
    }

    #[inline] pub(crate) fn bounds(&self) -> &Rect<f64> { &self.bounds }
    #[inline] pub(crate) fn margin(&self) -> f64 { self.margin }
    #[inline] pub(crate) fn scale(&self) -> f64 { self.scale }
    #[inline] pub(crate) fn width(&self) -> f64 { self.width }
    #[inline] pub(crate) fn height(&self) -> f64 { self.height }

    #[inline]
    pub(crate) fn project(&self, x: f64, y: f64) -> (f64, f64) {
        (self.margin + (x - self.bounds.min().x) * self.scale,
         self.margin + (self.bounds.max().y - y) * self.scale)
    }
}

/// Append path data for one ring as ` Mx,y Lx,y ... Z`.
pub(crate) fn ring_to_path(ring: &LineString<f64>, projection: &Projection, out: &mut String) {
    let mut coords = ring.coords_iter().map(|c| projection.project(c.x, c.y));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }
}

/// Path data for a MultiPolygon, holes included; draw with `fill-rule="evenodd"`.
pub(crate) fn multipolygon_to_path(shape: &MultiPolygon<f64>, projection: &Projection) -> String {
    let mut out = String::new();
    for polygon in shape {
        ring_to_path(polygon.exterior(), projection, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, projection, &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use geo::{coord, polygon};

    use super::*;

    #[test]
    fn projects_with_y_flipped() {
        let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 1.0 });
        let projection = Projection::new(bounds, 220.0, 10.0);
        assert_eq!(projection.scale(), 100.0);
        assert_eq!(projection.height(), 120.0);
        assert_eq!(projection.project(0.0, 1.0), (10.0, 10.0));
        assert_eq!(projection.project(2.0, 0.0), (210.0, 110.0));
    }

    #[test]
    fn path_has_one_subpath_per_ring() {
        let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let projection = Projection::new(bounds, 10.0, 0.0);
        let shape = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]]);
        let path = multipolygon_to_path(&shape, &projection);
        assert_eq!(path, " M0.000,10.000 L10.000,10.000 L10.000,0.000 L0.000,10.000Z");
    }
}
