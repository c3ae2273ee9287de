use std::collections::{HashMap, VecDeque};

use ahash::AHashMap;
use geo::{Area, BoundingRect, Coord, MultiPolygon, Rect};
use smallvec::SmallVec;

use crate::{
    error::{PlanError, Result},
    geom::{multipolygon_segments, perimeter, Segment},
    graph::Graph,
};

/// Reserved float series derived from unit footprints.
pub const AREA_SERIES: &str = "area";
pub const PERIMETER_SERIES: &str = "perimeter";

/// Immutable graph of indivisible geographic units.
///
/// Units are addressed by index `0..len()`. Each unit carries an identifier, a
/// footprint, named weight series, and a symmetric neighbor list whose edge
/// weights are shared boundary lengths. The graph is built once and shared
/// read-only (typically through an `Arc`) by every plan over the same map.
#[derive(Debug)]
pub struct UnitGraph {
    geo_ids: Vec<String>,
    shapes: Vec<MultiPolygon<f64>>,
    graph: Graph,
}

impl UnitGraph {
    /// Build a unit graph from explicit adjacency lists.
    ///
    /// `edge_lengths`, if given, must parallel `adjacency`; otherwise shared
    /// boundary lengths are measured from `shapes` (0.0 where shapes are empty
    /// or only touch at a point). `shapes` may be empty multipolygons for purely
    /// topological graphs.
    pub fn new(
        geo_ids: Vec<String>,
        shapes: Vec<MultiPolygon<f64>>,
        adjacency: Vec<Vec<u32>>,
        edge_lengths: Option<Vec<Vec<f64>>>,
        weights_i64: HashMap<String, Vec<i64>>,
        weights_f64: HashMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let n = geo_ids.len();
        if shapes.len() != n || adjacency.len() != n {
            return Err(PlanError::Construction(format!(
                "[UnitGraph::new] {n} ids, {} shapes, {} adjacency lists", shapes.len(), adjacency.len()
            )));
        }
        validate_adjacency(&adjacency)?;

        let edge_lengths = match edge_lengths {
            Some(lengths) => {
                let mismatched = lengths.len() != n
                    || lengths.iter().zip(&adjacency).any(|(w, a)| w.len() != a.len());
                if mismatched {
                    return Err(PlanError::Construction("[UnitGraph::new] edge_lengths must parallel adjacency".into()));
                }
                lengths
            }
            None => {
                let shared = shared_boundaries(&shapes);
                adjacency.iter().enumerate()
                    .map(|(u, neighbors)| neighbors.iter()
                        .map(|&v| shared.get(&(u.min(v as usize), u.max(v as usize))).copied().unwrap_or(0.0))
                        .collect())
                    .collect()
            }
        };

        Self::assemble(geo_ids, shapes, adjacency, edge_lengths, weights_i64, weights_f64)
    }

    /// Build a unit graph whose rook adjacency and shared boundary lengths are
    /// derived from the footprints: two units are neighbors when they share at
    /// least one boundary segment exactly.
    pub fn from_shapes(
        geo_ids: Vec<String>,
        shapes: Vec<MultiPolygon<f64>>,
        weights_i64: HashMap<String, Vec<i64>>,
        weights_f64: HashMap<String, Vec<f64>>,
    ) -> Result<Self> {
        if shapes.len() != geo_ids.len() {
            return Err(PlanError::Construction(format!(
                "[UnitGraph::from_shapes] {} ids but {} shapes", geo_ids.len(), shapes.len()
            )));
        }

        let mut adjacency = vec![Vec::new(); shapes.len()];
        let mut edge_lengths = vec![Vec::new(); shapes.len()];
        let mut pairs = shared_boundaries(&shapes).into_iter().collect::<Vec<_>>();
        pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        for ((u, v), length) in pairs {
            adjacency[u].push(v as u32);
            edge_lengths[u].push(length);
            adjacency[v].push(u as u32);
            edge_lengths[v].push(length);
        }

        Self::assemble(geo_ids, shapes, adjacency, edge_lengths, weights_i64, weights_f64)
    }

    fn assemble(
        geo_ids: Vec<String>,
        shapes: Vec<MultiPolygon<f64>>,
        adjacency: Vec<Vec<u32>>,
        edge_lengths: Vec<Vec<f64>>,
        weights_i64: HashMap<String, Vec<i64>>,
        mut weights_f64: HashMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let n = geo_ids.len();
        for (name, len) in weights_i64.iter().map(|(k, v)| (k, v.len()))
            .chain(weights_f64.iter().map(|(k, v)| (k, v.len())))
        {
            if name == AREA_SERIES || name == PERIMETER_SERIES {
                return Err(PlanError::Construction(format!("series name '{name}' is reserved")));
            }
            if weights_i64.contains_key(name) && weights_f64.contains_key(name) {
                return Err(PlanError::Construction(format!("series '{name}' given as both i64 and f64")));
            }
            if len != n {
                return Err(PlanError::Construction(format!("series '{name}' has {len} values for {n} units")));
            }
        }

        weights_f64.insert(AREA_SERIES.to_string(), shapes.iter().map(|s| s.unsigned_area()).collect());
        weights_f64.insert(PERIMETER_SERIES.to_string(), shapes.iter().map(perimeter).collect());

        let graph = Graph::new(n, &adjacency, &edge_lengths, weights_i64, weights_f64);
        Ok(Self { geo_ids, shapes, graph })
    }

    /// Number of units.
    #[inline] pub fn len(&self) -> usize { self.geo_ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geo_ids.is_empty() }

    /// Unit identifiers, by index.
    #[inline] pub fn geo_ids(&self) -> &[String] { &self.geo_ids }

    /// Unit footprints, by index.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Neighbors of a unit, in construction order.
    pub fn neighbors(&self, unit: usize) -> impl Iterator<Item = usize> + '_ { self.graph.edges(unit) }

    /// Neighbors of a unit paired with shared boundary length.
    pub fn neighbors_with_lengths(&self, unit: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.graph.edges_with_weights(unit)
    }

    /// Names of every weight series, including the derived `area` and `perimeter`.
    pub fn series(&self) -> Vec<&str> { self.graph.node_weights().series() }

    #[inline] pub fn has_series(&self, series: &str) -> bool { self.graph.node_weights().contains(series) }

    /// Value of a series for one unit.
    pub fn weight(&self, series: &str, unit: usize) -> Option<f64> {
        self.graph.node_weights().get_as_f64(series, unit)
    }

    /// Map-wide total of a series.
    pub fn total(&self, series: &str) -> Option<f64> { self.graph.node_weights().column_sum(series) }

    /// Whether the adjacency graph is connected (an empty graph is not).
    pub fn is_connected(&self) -> bool {
        if self.is_empty() { return false }

        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        let mut reached = 1;
        while let Some(u) = queue.pop_front() {
            for v in self.graph.edges(u) {
                if !seen[v] { seen[v] = true; reached += 1; queue.push_back(v); }
            }
        }
        reached == self.len()
    }

    /// Bounding rectangle of all footprints, if any are non-empty.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    #[inline] pub(crate) fn graph(&self) -> &Graph { &self.graph }
}

fn validate_adjacency(adjacency: &[Vec<u32>]) -> Result<()> {
    let n = adjacency.len();
    for (u, neighbors) in adjacency.iter().enumerate() {
        let mut sorted = neighbors.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(PlanError::Construction(format!("unit {u} lists a neighbor twice")));
        }
        for &v in neighbors {
            let v = v as usize;
            if v >= n {
                return Err(PlanError::Construction(format!("unit {u} has neighbor {v} outside [0, {n})")));
            }
            if v == u {
                return Err(PlanError::Construction(format!("unit {u} lists itself as a neighbor")));
            }
            if !adjacency[v].contains(&(u as u32)) {
                return Err(PlanError::Construction(format!("adjacency is not symmetric: {u} -> {v} has no reverse")));
            }
        }
    }
    Ok(())
}

/// Shared boundary length for every pair of shapes that share at least one segment,
/// keyed by `(min, max)` unit index.
fn shared_boundaries(shapes: &[MultiPolygon<f64>]) -> AHashMap<(usize, usize), f64> {
    let mut owners: AHashMap<Segment, SmallVec<[(usize, f64); 2]>> = AHashMap::new();
    for (unit, shape) in shapes.iter().enumerate() {
        for (segment, start, end) in multipolygon_segments(shape) {
            let length = (end.x - start.x).hypot(end.y - start.y);
            let entry = owners.entry(segment.undirected()).or_default();
            if !entry.iter().any(|&(u, _)| u == unit) { entry.push((unit, length)) }
        }
    }

    let mut shared = AHashMap::new();
    for units in owners.values() {
        for (i, &(a, length)) in units.iter().enumerate() {
            for &(b, _) in &units[i + 1..] {
                *shared.entry((a.min(b), a.max(b))).or_insert(0.0) += length;
            }
        }
    }
    shared
}
