use std::collections::VecDeque;

use ahash::AHashSet;
use smallvec::SmallVec;

use crate::partition::{Infeasible, Partition};

impl Partition {
    /// Check whether removing `node` from its part leaves the rest of the part connected.
    ///
    /// Searches from one same-part neighbor without passing through `node`, stopping as
    /// soon as every other same-part neighbor has been reached.
    pub(crate) fn check_node_contiguity(&self, node: usize) -> bool {
        let part = self.assignment(node);
        let graph = self.graph();

        let targets = graph.edges(node)
            .filter(|&v| self.assignment(v) == part)
            .collect::<SmallVec<[usize; 8]>>();
        if targets.len() <= 1 { return true }

        let mut remaining = targets.len() - 1;
        let mut visited = AHashSet::from_iter([node, targets[0]]);
        let mut queue = VecDeque::from([targets[0]]);
        while let Some(u) = queue.pop_front() {
            for v in graph.edges(u) {
                if self.assignment(v) != part || !visited.insert(v) { continue }
                if targets[1..].contains(&v) {
                    remaining -= 1;
                    if remaining == 0 { return true }
                }
                queue.push_back(v);
            }
        }
        false
    }

    /// Whether `node` has at least one neighbor in `part`.
    #[inline]
    pub(crate) fn node_borders_part(&self, node: usize, part: usize) -> bool {
        self.graph().edges(node).any(|v| self.assignment(v) == part)
    }

    /// Feasibility of moving `node` into `part`, checked in a fixed order.
    pub(crate) fn check_move(&self, node: usize, part: usize) -> Result<(), Infeasible> {
        let prev = self.assignment(node);
        if prev == part { return Err(Infeasible::SameDistrict) }
        if !self.node_borders_part(node, part) { return Err(Infeasible::NotAdjacent) }
        if self.members(prev).len() == 1 { return Err(Infeasible::WouldEmpty) }
        if !self.check_node_contiguity(node) { return Err(Infeasible::WouldDisconnect) }
        Ok(())
    }

    /// Check whether a part induces a connected subgraph (empty parts are not connected).
    pub(crate) fn part_is_connected(&self, part: usize) -> bool {
        let members = self.members(part);
        let Some(&start) = members.first() else { return false };

        let graph = self.graph();
        let mut visited = AHashSet::with_capacity(members.len());
        visited.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            for v in graph.edges(u) {
                if self.assignment(v) == part && visited.insert(v) { queue.push_back(v) }
            }
        }
        visited.len() == members.len()
    }

    /// Every district is non-empty and connected, and nothing is left unassigned.
    pub(crate) fn is_contiguous(&self) -> bool {
        self.is_fully_assigned() && (0..self.num_districts()).all(|part| self.part_is_connected(part))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use geo::MultiPolygon;

    use crate::{map::UnitGraph, partition::Partition};

    use super::*;

    /// Dumbbell: triangle {0,1,2} - bridge 3 - triangle {4,5,6}.
    fn dumbbell() -> Partition {
        let adjacency = vec![
            vec![1, 2], vec![0, 2], vec![0, 1, 3],
            vec![2, 4],
            vec![3, 5, 6], vec![4, 6], vec![4, 5],
        ];
        let units = UnitGraph::new(
            (0..7).map(|i| format!("d{i}")).collect(),
            vec![MultiPolygon(vec![]); 7],
            adjacency,
            None,
            HashMap::new(),
            HashMap::new(),
        ).unwrap();
        Partition::new(2, Arc::new(units))
    }

    #[test]
    fn bridge_removal_disconnects() {
        let mut partition = dumbbell();
        partition.set_assignments(&[0, 0, 0, 0, 0, 0, 1]);

        assert!(!partition.check_node_contiguity(3));
        assert!(!partition.check_node_contiguity(2));
        assert!(partition.check_node_contiguity(0));
        assert!(partition.check_node_contiguity(5));
    }

    #[test]
    fn check_move_reports_reasons_in_order() {
        let mut partition = dumbbell();
        partition.set_assignments(&[0, 0, 0, 0, 0, 0, 1]);

        assert_eq!(partition.check_move(6, 1), Err(Infeasible::SameDistrict));
        assert_eq!(partition.check_move(0, 1), Err(Infeasible::NotAdjacent));
        assert_eq!(partition.check_move(6, 0), Err(Infeasible::WouldEmpty));
        assert_eq!(partition.check_move(4, 1), Err(Infeasible::WouldDisconnect));
        assert_eq!(partition.check_move(5, 1), Ok(()));
    }

    #[test]
    fn contiguity_of_whole_partition() {
        let mut partition = dumbbell();
        assert!(!partition.is_contiguous());

        partition.set_assignments(&[0, 0, 0, 1, 1, 1, 1]);
        assert!(partition.is_contiguous());

        partition.set_assignments(&[0, 1, 0, 0, 0, 1, 0]);
        assert!(partition.part_is_connected(0) && !partition.part_is_connected(1));
        assert!(!partition.is_contiguous());
    }
}
