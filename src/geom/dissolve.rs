//! Topology-aware dissolve of unit footprints into one shape.
//!
//! Every unit ring is oriented (shells counter-clockwise, holes clockwise) and
//! broken into directed, quantized segments. A segment shared by two member
//! units appears once in each direction and cancels. What survives is the
//! boundary of the union with the interior on its left, which is stitched back
//! into rings taking the leftmost turn wherever several boundary edges meet.

use ahash::AHashMap;
use geo::{orient::{Direction, Orient}, Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use rstar::RTree;
use smallvec::SmallVec;

use crate::geom::{multipolygon_segments, signed_ring_area, BoundingBox, QuantizedPoint, Segment};

/// Rings with smaller absolute area are treated as degenerate and dropped.
const MIN_RING_AREA: f64 = 1e-18;

type Outgoing = AHashMap<QuantizedPoint, SmallVec<[QuantizedPoint; 2]>>;

/// Merge a collection of edge-sharing shapes into a single MultiPolygon.
pub(crate) fn dissolve<'a>(shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let mut remaining: AHashMap<Segment, u32> = AHashMap::new();
    let mut coords: AHashMap<QuantizedPoint, Coord<f64>> = AHashMap::new();

    for shape in shapes {
        let shape = shape.orient(Direction::Default);
        for (segment, start, end) in multipolygon_segments(&shape) {
            coords.entry(segment.0).or_insert(start);
            coords.entry(segment.1).or_insert(end);

            let back = segment.reversed();
            if let Some(count) = remaining.get_mut(&back) {
                *count -= 1;
                if *count == 0 { remaining.remove(&back); }
            } else {
                *remaining.entry(segment).or_insert(0) += 1;
            }
        }
    }

    // Sorted so ring discovery does not depend on hash order.
    let mut segments = remaining.into_iter()
        .flat_map(|(segment, count)| std::iter::repeat_n(segment, count as usize))
        .collect::<Vec<_>>();
    segments.sort_unstable();

    let mut outgoing = Outgoing::default();
    for segment in &segments {
        outgoing.entry(segment.0).or_default().push(segment.1);
    }

    let (mut shells, mut holes) = (Vec::new(), Vec::new());
    for ring in stitch_rings(&segments, &mut outgoing) {
        let ring = ring.iter().map(|q| coords[q]).collect::<Vec<_>>();
        let area = signed_ring_area(&ring);
        if area > MIN_RING_AREA { shells.push((ring, area)) }
        else if area < -MIN_RING_AREA { holes.push((ring, -area)) }
    }

    assemble(shells, holes)
}

/// Remove one copy of the edge `from -> to`, returning whether it was present.
fn take_edge(outgoing: &mut Outgoing, from: QuantizedPoint, to: QuantizedPoint) -> bool {
    let Some(targets) = outgoing.get_mut(&from) else { return false };
    let Some(pos) = targets.iter().position(|&t| t == to) else { return false };
    targets.swap_remove(pos);
    true
}

/// Among the unused edges leaving `curr`, the one turning furthest left
/// relative to the incoming direction `prev -> curr`.
fn leftmost_next(outgoing: &Outgoing, prev: QuantizedPoint, curr: QuantizedPoint) -> Option<QuantizedPoint> {
    let (ux, uy) = ((curr.0 - prev.0) as f64, (curr.1 - prev.1) as f64);
    let turn = |next: &QuantizedPoint| {
        let (wx, wy) = ((next.0 - curr.0) as f64, (next.1 - curr.1) as f64);
        (ux * wy - uy * wx).atan2(ux * wx + uy * wy)
    };

    outgoing.get(&curr)?.iter()
        .max_by(|a, b| turn(a).total_cmp(&turn(b)))
        .copied()
}

/// Walk the surviving directed segments into closed rings of quantized points.
fn stitch_rings(segments: &[Segment], outgoing: &mut Outgoing) -> Vec<Vec<QuantizedPoint>> {
    let mut rings = Vec::new();

    for seed in segments {
        if !take_edge(outgoing, seed.0, seed.1) { continue }

        let start = seed.0;
        let mut ring = vec![start];
        let (mut prev, mut curr) = (seed.0, seed.1);
        let mut closed = true;

        while curr != start {
            ring.push(curr);
            let Some(next) = leftmost_next(outgoing, prev, curr) else { closed = false; break };
            take_edge(outgoing, curr, next);
            (prev, curr) = (curr, next);
        }

        if closed && ring.len() >= 3 { rings.push(ring) }
        else { tracing::debug!(len = ring.len(), "dropping open boundary chain during dissolve") }
    }

    rings
}

/// Attach every hole to the smallest shell that encloses it.
fn assemble(mut shells: Vec<(Vec<Coord<f64>>, f64)>, holes: Vec<(Vec<Coord<f64>>, f64)>) -> MultiPolygon<f64> {
    shells.sort_by(|a, b| b.1.total_cmp(&a.1));

    let outlines = shells.iter()
        .map(|(ring, _)| Polygon::new(LineString::from(ring.clone()), vec![]))
        .collect::<Vec<_>>();
    let rtree = RTree::bulk_load(
        shells.iter().enumerate()
            .filter_map(|(i, (ring, _))| BoundingBox::of_coords(i, ring))
            .collect()
    );

    let mut interiors = vec![Vec::new(); shells.len()];
    for (hole, hole_area) in holes {
        let Some(envelope) = BoundingBox::of_coords(0, &hole) else { continue };
        let owner = rtree.locate_in_envelope_intersecting(&envelope.aabb())
            .map(|bbox| bbox.idx())
            .filter(|&i| shells[i].1 > hole_area && ring_inside(&outlines[i], &hole))
            .min_by(|&a, &b| shells[a].1.total_cmp(&shells[b].1));

        match owner {
            Some(i) => interiors[i].push(LineString::from(hole)),
            None => tracing::warn!(area = hole_area, "dissolve produced a hole with no enclosing shell"),
        }
    }

    MultiPolygon(shells.into_iter().zip(interiors)
        .map(|((ring, _), holes)| Polygon::new(LineString::from(ring), holes))
        .collect())
}

/// A hole lies inside a shell if any of its vertices or edge midpoints is strictly interior.
fn ring_inside(shell: &Polygon<f64>, ring: &[Coord<f64>]) -> bool {
    let midpoints = ring.iter().zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| Coord { x: (a.x + b.x) / 2.0, y: (a.y + b.y) / 2.0 });

    ring.iter().copied().chain(midpoints)
        .any(|c| shell.contains(&Point::from(c)))
}
