use rand::{seq::{IndexedRandom, IteratorRandom}, Rng};
use smallvec::SmallVec;

use crate::partition::Partition;

impl Partition {
    /// Select a random node from a given part.
    pub(crate) fn random_node_from_part(&self, part: usize, rng: &mut impl Rng) -> Option<usize> {
        self.parts.get(part).choose(rng).copied()
    }

    /// Select a random unassigned node that borders an assigned district.
    pub(crate) fn random_unassigned_boundary_node(&self, rng: &mut impl Rng) -> Option<usize> {
        self.frontiers.get(self.unassigned()).choose(rng).copied()
    }

    /// Select a part bordering `node` other than its own, uniformly over distinct parts.
    pub(crate) fn random_neighboring_part(&self, node: usize, rng: &mut impl Rng) -> Option<usize> {
        let own = self.assignment(node);
        let mut parts = SmallVec::<[usize; 8]>::new();
        for part in self.graph().edges(node).map(|v| self.assignment(v)) {
            if part != own && !parts.contains(&part) { parts.push(part) }
        }
        parts.choose(rng).copied()
    }

    /// Randomly assign all nodes to contiguous districts.
    ///
    /// Each district is seeded with a distinct random node, then districts grow by
    /// claiming random unassigned nodes on their boundary. Returns `false` (leaving
    /// some nodes unassigned) when the graph is disconnected.
    pub(crate) fn randomize(&mut self, rng: &mut impl Rng) -> bool {
        self.clear_assignments();
        let unassigned = self.unassigned();

        // Seed districts with random starting nodes.
        for part in 0..self.num_districts() {
            let Some(seed) = self.random_node_from_part(unassigned, rng) else { return false };
            self.move_node(seed, part);
        }

        // Expand districts until all nodes are assigned.
        while let Some(u) = self.random_unassigned_boundary_node(rng) {
            let districts = self.graph().edges(u)
                .map(|v| self.assignment(v))
                .filter(|&p| p != unassigned);
            let Some(part) = districts.choose(rng) else { break };
            self.move_node(u, part);
        }

        self.is_fully_assigned()
    }
}
