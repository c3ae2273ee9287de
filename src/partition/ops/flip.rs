use std::fmt;

use crate::partition::Partition;

/// Why a proposed single-unit move cannot be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Infeasible {
    /// The unit is already in the target district.
    SameDistrict,
    /// The unit has no neighbor in the target district.
    NotAdjacent,
    /// The unit is the last member of its district.
    WouldEmpty,
    /// Removing the unit splits its district into pieces.
    WouldDisconnect,
}

impl fmt::Display for Infeasible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Infeasible::SameDistrict => "unit is already in the target district",
            Infeasible::NotAdjacent => "unit does not border the target district",
            Infeasible::WouldEmpty => "move would leave its district empty",
            Infeasible::WouldDisconnect => "move would disconnect its district",
        })
    }
}

/// Result of a move proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied,
    Infeasible(Infeasible),
}

impl MoveOutcome {
    #[inline] pub fn is_applied(&self) -> bool { matches!(self, MoveOutcome::Applied) }
}

impl Partition {
    /// Move a single node to a different part, updating caches.
    /// Feasibility is the caller's concern; see `check_move`.
    pub(crate) fn move_node(&mut self, node: usize, part: usize) {
        assert!(node < self.num_nodes(), "node {node} out of range");
        assert!(part < self.parts.num_sets(), "part {part} out of range [0, {})", self.parts.num_sets());

        let prev = self.assignment(node);
        if prev == part { return }

        // Commit assignment.
        self.parts.move_to(node, part);

        // Refresh boundary membership of `node` and its neighbors.
        let Self { parts, frontiers, frontier_edges, units, .. } = self;
        let graph = units.graph();
        let on_frontier = graph.edges(node).any(|v| parts.find(v) != part);
        frontiers.set(node, on_frontier.then_some(part));
        for u in graph.edges(node) {
            let owner = parts.find(u);
            let on_frontier = graph.edges(u).any(|v| parts.find(v) != owner);
            frontiers.set(u, on_frontier.then_some(owner));
        }

        // Only half-edges incident to `node` can change state.
        for (e, v) in graph.half_edges(node) {
            let owner = parts.find(v);
            let crossing = owner != part;
            frontier_edges.set(e, crossing.then_some(part));
            frontier_edges.set(graph.twin(e), crossing.then_some(owner));
        }

        self.update_on_node_move(node, prev, part);
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use crate::map::UnitGraph;

    use super::*;

    /// Path 0 - 1 - 2 - 3 with unit populations and unit edge lengths.
    fn path() -> Partition {
        let adjacency = vec![vec![1], vec![0, 2], vec![1, 3], vec![2]];
        let units = UnitGraph::new(
            (0..4).map(|i| i.to_string()).collect(),
            vec![geo::MultiPolygon(vec![]); 4],
            adjacency,
            Some(vec![vec![1.0], vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0]]),
            HashMap::from([("pop".to_string(), vec![10, 20, 30, 40])]),
            HashMap::new(),
        ).unwrap();
        let mut partition = Partition::new(2, Arc::new(units));
        partition.set_assignments(&[0, 0, 1, 1]);
        partition
    }

    #[test]
    fn move_updates_totals_and_frontiers() {
        let mut partition = path();
        partition.move_node(1, 1);

        assert_eq!(partition.assignments(), &[0, 1, 1, 1]);
        assert_eq!(partition.part_totals("pop"), Some(vec![10.0, 90.0]));
        assert_eq!(partition.frontier(0), &[0]);
        assert_eq!(partition.frontier(1), &[1]);
        assert!(!partition.frontiers.contains(2));
        assert_eq!(partition.boundary_edge_count(0), 1);
        assert_eq!(partition.boundary_edge_count(1), 1);
    }

    #[test]
    fn incremental_caches_match_a_rebuild() {
        let mut moved = path();
        moved.move_node(2, 0);
        moved.move_node(1, 1);

        let mut rebuilt = path();
        rebuilt.set_assignments(moved.assignments().to_vec().as_slice());

        for part in 0..3 {
            assert_eq!(moved.part_total("pop", part), rebuilt.part_total("pop", part));
            assert!((moved.part_perimeter(part) - rebuilt.part_perimeter(part)).abs() < 1e-9);
            let (mut a, mut b) = (moved.frontier(part).to_vec(), rebuilt.frontier(part).to_vec());
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
            assert_eq!(moved.boundary_edge_count(part), rebuilt.boundary_edge_count(part));
        }
    }

    #[test]
    fn moving_to_same_part_is_a_noop() {
        let mut partition = path();
        partition.move_node(0, 0);
        assert_eq!(partition.assignments(), &[0, 0, 1, 1]);
    }

    #[test]
    fn outcome_reports_reason() {
        assert!(MoveOutcome::Applied.is_applied());
        let rejected = MoveOutcome::Infeasible(Infeasible::WouldDisconnect);
        assert!(!rejected.is_applied());
        assert_eq!(Infeasible::WouldEmpty.to_string(), "move would leave its district empty");
    }
}
