use std::collections::HashMap;

use crate::graph::WeightMatrix;

/// A weighted, undirected graph in compressed sparse row format.
///
/// Every undirected edge is stored as two half-edges; `twins[e]` is the index of
/// the half-edge running the opposite way, so boundary bookkeeping never scans.
#[derive(Debug, Default)]
pub(crate) struct Graph {
    size: usize,
    offsets: Vec<u32>,
    edges: Vec<u32>,
    twins: Vec<u32>,
    edge_weights: Vec<f64>,
    node_weights: WeightMatrix,
}

impl Graph {
    /// Construct a graph from symmetric adjacency lists and node weights.
    pub(crate) fn new(num_nodes: usize, edges: &[Vec<u32>], edge_weights: &[Vec<f64>],
        weights_i64: HashMap<String, Vec<i64>>,
        weights_f64: HashMap<String, Vec<f64>>,
    ) -> Self {
        assert!(edges.len() == num_nodes, "edges.len() must equal num_nodes");
        assert!(edge_weights.len() == num_nodes, "edge_weights.len() must equal num_nodes");
        edges.iter().zip(edge_weights.iter()).enumerate().for_each(|(i, (edges, weights))| {
            assert!(edges.len() == weights.len(), "edges[{i}].len() must equal edge_weights[{i}].len()");
        });

        let offsets = std::iter::once(0u32).chain(
            edges.iter()
                .map(|v| v.len() as u32)
                .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
        ).collect::<Vec<u32>>();

        // Pair each half-edge u->v with v->u.
        let twins = edges.iter().enumerate().flat_map(|(u, neighbors)| {
            let offsets = &offsets;
            neighbors.iter().map(move |&v| {
                assert!((v as usize) < num_nodes, "edge {u}->{v} points outside the graph");
                let back = edges[v as usize].iter().position(|&w| w as usize == u)
                    .unwrap_or_else(|| panic!("edge {u}->{v} has no reverse edge"));
                offsets[v as usize] + back as u32
            })
        }).collect::<Vec<u32>>();

        Self {
            size: num_nodes,
            offsets,
            edges: edges.iter().flatten().copied().collect(),
            twins,
            edge_weights: edge_weights.iter().flatten().copied().collect(),
            node_weights: WeightMatrix::new(num_nodes, weights_i64, weights_f64),
        }
    }

    /// Get the number of nodes in the graph.
    #[inline] pub(crate) fn node_count(&self) -> usize { self.size }

    /// Get the number of half-edges in the graph (twice the undirected edge count).
    #[inline] pub(crate) fn edge_count(&self) -> usize { self.edges.len() }

    /// Get a reference to the node weights matrix.
    #[inline] pub(crate) fn node_weights(&self) -> &WeightMatrix { &self.node_weights }

    /// Get the range of half-edge indices for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub(crate) fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get the ith neighbor of a given node.
    #[inline]
    pub(crate) fn edge(&self, node: usize, i: usize) -> Option<usize> {
        self.range(node).nth(i).map(|v| self.edges[v] as usize)
    }

    /// Target node of a half-edge.
    #[inline] pub(crate) fn target(&self, edge: usize) -> usize { self.edges[edge] as usize }

    /// The reverse of a half-edge.
    #[inline] pub(crate) fn twin(&self, edge: usize) -> usize { self.twins[edge] as usize }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub(crate) fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Get an iterator over `(half_edge, neighbor)` pairs of a given node.
    #[inline]
    pub(crate) fn half_edges(&self, node: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.range(node).map(move |e| (e, self.edges[e] as usize))
    }

    /// Get an iterator over the neighbors and edge weights of a given node.
    #[inline]
    pub(crate) fn edges_with_weights(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.range(node).map(move |v| (self.edges[v] as usize, self.edge_weights[v]))
    }
}
