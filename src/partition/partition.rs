use std::sync::Arc;

use crate::{
    graph::{Graph, WeightMatrix},
    map::{UnitGraph, AREA_SERIES, PERIMETER_SERIES},
    partition::structures::{BucketSet, PartitionSet},
};

/// A partition of the unit graph into districts `0..N`, plus an unassigned bucket `N`.
#[derive(Clone, Debug)]
pub(crate) struct Partition {
    pub(super) parts: PartitionSet,       // Sets of nodes in each part (unassigned is the last)
    pub(super) frontiers: BucketSet,      // Nodes with a neighbor in another part, by part
    pub(super) frontier_edges: BucketSet, // Half-edges crossing parts, by source part
    pub(super) part_weights: WeightMatrix, // Per-part totals of every series
    pub(super) part_perimeters: Vec<f64>, // Outer boundary length of each part
    region_weights: WeightMatrix,         // Single row of whole-map totals
    pub(super) units: Arc<UnitGraph>,
}

impl Partition {
    /// Construct a partition with every node unassigned.
    pub(crate) fn new(num_districts: usize, units: Arc<UnitGraph>) -> Self {
        assert!(num_districts > 0, "num_districts must be at least 1");
        let num_nodes = units.len();
        let num_parts = num_districts + 1;

        let mut part_weights = units.graph().node_weights().copy_of_size(num_parts);
        part_weights.set_row_to_sum_of(num_districts, units.graph().node_weights());
        let mut part_perimeters = vec![0.0; num_parts];
        part_perimeters[num_districts] = Self::outer_perimeter(&units, 0..num_nodes);

        let mut region_weights = units.graph().node_weights().copy_of_size(1);
        region_weights.set_row_to_sum_of(0, units.graph().node_weights());

        Self {
            parts: PartitionSet::new(num_parts, num_nodes, num_districts),
            frontiers: BucketSet::new(num_parts, num_nodes),
            frontier_edges: BucketSet::new(num_parts, units.graph().edge_count()),
            part_weights,
            part_perimeters,
            region_weights,
            units,
        }
    }

    /// Number of districts, not counting the unassigned bucket.
    #[inline] pub(crate) fn num_districts(&self) -> usize { self.parts.num_sets() - 1 }

    /// Index of the unassigned bucket.
    #[inline] pub(crate) fn unassigned(&self) -> usize { self.num_districts() }

    #[inline] pub(crate) fn num_nodes(&self) -> usize { self.parts.num_elems() }

    #[inline] pub(crate) fn graph(&self) -> &Graph { self.units.graph() }

    #[inline] pub(crate) fn units(&self) -> &Arc<UnitGraph> { &self.units }

    /// Get the part a node currently belongs to.
    #[inline] pub(crate) fn assignment(&self, node: usize) -> usize { self.parts.find(node) }

    /// Part of every node, indexed by node.
    #[inline] pub(crate) fn assignments(&self) -> &[usize] { self.parts.assignments() }

    /// Nodes currently in a part.
    #[inline] pub(crate) fn members(&self, part: usize) -> &[usize] { self.parts.get(part) }

    /// Nodes of a part that touch another part.
    #[inline] pub(crate) fn frontier(&self, part: usize) -> &[usize] { self.frontiers.get(part) }

    /// Half-edges leaving a part.
    #[inline] pub(crate) fn frontier_edges(&self, part: usize) -> &[usize] { self.frontier_edges.get(part) }

    /// Number of cut half-edges whose source lies in `part`.
    #[inline] pub(crate) fn boundary_edge_count(&self, part: usize) -> usize { self.frontier_edges.get(part).len() }

    #[inline] pub(crate) fn part_is_empty(&self, part: usize) -> bool { self.parts.get(part).is_empty() }

    /// True once the unassigned bucket is empty.
    #[inline] pub(crate) fn is_fully_assigned(&self) -> bool { self.part_is_empty(self.unassigned()) }

    /// Clear all assignments, sending every node to the unassigned bucket.
    pub(crate) fn clear_assignments(&mut self) {
        self.parts.clear();
        self.frontiers.clear();
        self.frontier_edges.clear();

        let unassigned = self.unassigned();
        self.part_weights.clear_all_rows();
        self.part_weights.set_row_to_sum_of(unassigned, self.units.graph().node_weights());
        self.part_perimeters.fill(0.0);
        self.part_perimeters[unassigned] = Self::outer_perimeter(&self.units, 0..self.num_nodes());
    }

    /// Replace every assignment at once and rebuild all caches.
    /// Callers are responsible for validating `assignments` first.
    pub(crate) fn set_assignments(&mut self, assignments: &[usize]) {
        assert!(assignments.len() == self.num_nodes(), "assignments.len() must equal number of nodes");
        self.parts.rebuild(assignments);

        let graph = self.units.graph();
        self.frontiers.rebuild_from((0..graph.node_count()).filter_map(|u| {
            let part = assignments[u];
            graph.edges(u).any(|v| assignments[v] != part).then_some((u, part))
        }));
        self.frontier_edges.rebuild_from((0..graph.node_count()).flat_map(|u| {
            graph.half_edges(u)
                .filter(move |&(_, v)| assignments[v] != assignments[u])
                .map(move |(e, _)| (e, assignments[u]))
        }));

        self.part_weights.clear_all_rows();
        for (node, &part) in assignments.iter().enumerate() {
            self.part_weights.add_row_from(part, graph.node_weights(), node);
        }

        self.part_perimeters = (0..self.parts.num_sets())
            .map(|part| Self::outer_perimeter(&self.units, self.parts.get(part).iter().copied()))
            .collect();
    }

    /// Sum of a series over a part, if the series exists.
    pub(crate) fn part_total(&self, series: &str, part: usize) -> Option<f64> {
        self.part_weights.get_as_f64(series, part)
    }

    /// Sum of a series for each district (unassigned excluded).
    pub(crate) fn part_totals(&self, series: &str) -> Option<Vec<f64>> {
        (0..self.num_districts()).map(|part| self.part_total(series, part)).collect()
    }

    /// Total of a series over the whole map.
    #[inline] pub(crate) fn region_total(&self, series: &str) -> Option<f64> { self.region_weights.get_as_f64(series, 0) }

    #[inline] pub(crate) fn part_perimeter(&self, part: usize) -> f64 { self.part_perimeters[part] }

    pub(crate) fn part_area(&self, part: usize) -> f64 {
        self.part_total(AREA_SERIES, part).unwrap_or(0.0)
    }

    /// Update part totals and perimeters for a node leaving `prev` for `part`.
    /// Must run after the assignment itself has changed.
    pub(super) fn update_on_node_move(&mut self, node: usize, prev: usize, part: usize) {
        let graph = self.units.graph();
        self.part_weights.subtract_row_from(prev, graph.node_weights(), node);
        self.part_weights.add_row_from(part, graph.node_weights(), node);

        let (mut shared_prev, mut shared_part) = (0.0, 0.0);
        for (v, length) in graph.edges_with_weights(node) {
            let owner = self.parts.find(v);
            if owner == prev { shared_prev += length }
            else if owner == part { shared_part += length }
        }

        let own = graph.node_weights().get_as_f64(PERIMETER_SERIES, node).unwrap_or(0.0);
        self.part_perimeters[prev] -= own - 2.0 * shared_prev;
        self.part_perimeters[part] += own - 2.0 * shared_part;
    }

    /// Outer boundary length of a set of nodes: member perimeters minus both sides of internal edges.
    fn outer_perimeter(units: &UnitGraph, nodes: impl IntoIterator<Item = usize> + Clone) -> f64 {
        let graph = units.graph();
        let mut inside = vec![false; graph.node_count()];
        nodes.clone().into_iter().for_each(|u| inside[u] = true);

        nodes.into_iter().map(|u| {
            let own = graph.node_weights().get_as_f64(PERIMETER_SERIES, u).unwrap_or(0.0);
            own - graph.edges_with_weights(u).filter(|&(v, _)| inside[v]).map(|(_, w)| w).sum::<f64>()
        }).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use geo::{polygon, MultiPolygon};

    use super::*;

    /// 3x1 strip of unit squares with populations 1, 2, 3.
    fn strip() -> Arc<UnitGraph> {
        let shapes = (0..3).map(|i| {
            let x = i as f64;
            MultiPolygon(vec![polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]])
        }).collect();
        let ids = (0..3).map(|i| format!("s{i}")).collect();
        Arc::new(UnitGraph::from_shapes(ids, shapes, HashMap::from([("pop".to_string(), vec![1, 2, 3])]), HashMap::new()).unwrap())
    }

    #[test]
    fn new_partition_is_all_unassigned() {
        let partition = Partition::new(2, strip());
        assert_eq!(partition.num_districts(), 2);
        assert_eq!(partition.unassigned(), 2);
        assert_eq!(partition.members(2).len(), 3);
        assert!(!partition.is_fully_assigned());
        assert_eq!(partition.part_total("pop", 2), Some(6.0));
        assert_eq!(partition.region_total("pop"), Some(6.0));
        assert!((partition.part_perimeter(2) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn set_assignments_rebuilds_caches() {
        let mut partition = Partition::new(2, strip());
        partition.set_assignments(&[0, 0, 1]);

        assert!(partition.is_fully_assigned());
        assert_eq!(partition.part_totals("pop"), Some(vec![3.0, 3.0]));
        assert_eq!(partition.frontier(0), &[1]);
        assert_eq!(partition.frontier(1), &[2]);
        assert_eq!(partition.boundary_edge_count(0), 1);
        assert_eq!(partition.boundary_edge_count(1), 1);
        assert!((partition.part_perimeter(0) - 6.0).abs() < 1e-9);
        assert!((partition.part_perimeter(1) - 4.0).abs() < 1e-9);
        assert!((partition.part_area(0) - 2.0).abs() < 1e-9);
        assert_eq!(partition.part_totals("missing"), None);
    }

    #[test]
    fn clear_returns_everything_to_unassigned() {
        let mut partition = Partition::new(2, strip());
        partition.set_assignments(&[0, 1, 1]);
        partition.clear_assignments();

        assert_eq!(partition.part_totals("pop"), Some(vec![0.0, 0.0]));
        assert_eq!(partition.part_total("pop", 2), Some(6.0));
        assert!(partition.frontier(0).is_empty());
        assert_eq!(partition.region_total("pop"), Some(6.0));
        assert_eq!(partition.boundary_edge_count(1), 0);
        assert_eq!(partition.part_perimeter(0), 0.0);
    }
}
