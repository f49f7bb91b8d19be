//! Compressed Sparse Row (CSR) link graph
//!
//! The graph is stored transposed: row `i` lists the predecessors of node
//! `i`. Power iteration pulls mass from predecessors, so each node's update
//! reads one contiguous slice and writes only its own slot.

use super::builder::EdgeListBuilder;
use crate::error::Result;

/// An immutable directed graph in predecessor-CSR format
///
/// Built once from a complete edge stream. Shared read-only between any
/// number of concurrent solver runs.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Number of nodes
    num_nodes: usize,
    /// Row pointers: predecessors of node i are at pred_ptr[i]..pred_ptr[i+1]
    pred_ptr: Vec<usize>,
    /// Source node of each incoming edge, grouped by target
    pred_idx: Vec<u32>,
    /// Out-degree for each node
    out_degree: Vec<u32>,
}

impl Graph {
    /// Build a graph of `num_nodes` nodes from a stream of `(from, to)` pairs
    ///
    /// Fails with [`InvalidEdge`](crate::PageRankError::InvalidEdge) if any
    /// endpoint lies outside `[0, num_nodes)`, and with
    /// [`InvalidParameter`](crate::PageRankError::InvalidParameter) if
    /// `num_nodes` exceeds [`MAX_NODES`](super::builder::MAX_NODES).
    pub fn build<I>(edges: I, num_nodes: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut builder = EdgeListBuilder::new(num_nodes)?;
        builder.extend(edges)?;
        Ok(Self::from_builder(builder))
    }

    /// Convert a builder into CSR format
    ///
    /// Predecessors keep edge arrival order (stable counting sort by target).
    pub fn from_builder(builder: EdgeListBuilder) -> Self {
        let num_nodes = builder.node_count();

        let mut pred_ptr = Vec::with_capacity(num_nodes + 1);
        pred_ptr.push(0);
        let mut running = 0usize;
        for &deg in builder.in_degrees() {
            running += deg as usize;
            pred_ptr.push(running);
        }

        let mut cursor: Vec<usize> = pred_ptr[..num_nodes].to_vec();
        let mut pred_idx = vec![0u32; builder.edge_count()];
        for &(from, to) in builder.edges() {
            let slot = &mut cursor[to as usize];
            pred_idx[*slot] = from;
            *slot += 1;
        }

        Self {
            num_nodes,
            pred_ptr,
            pred_idx,
            out_degree: builder.out_degrees().to_vec(),
        }
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Total number of edges, multi-edges included
    pub fn num_edges(&self) -> usize {
        self.pred_idx.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Get the out-degree of a node
    #[inline]
    pub fn out_degree(&self, node: u32) -> u32 {
        self.out_degree[node as usize]
    }

    /// Out-degrees of all nodes, indexed by node id
    pub fn out_degrees(&self) -> &[u32] {
        &self.out_degree
    }

    /// Nodes with an edge into `node`, one entry per edge occurrence
    #[inline]
    pub fn predecessors(&self, node: u32) -> &[u32] {
        let start = self.pred_ptr[node as usize];
        let end = self.pred_ptr[node as usize + 1];
        &self.pred_idx[start..end]
    }

    /// Get the in-degree of a node
    pub fn in_degree(&self, node: u32) -> usize {
        self.pred_ptr[node as usize + 1] - self.pred_ptr[node as usize]
    }

    /// Find dangling nodes (nodes with no outgoing edges)
    pub fn dangling_nodes(&self) -> Vec<u32> {
        (0..self.num_nodes as u32)
            .filter(|&n| self.out_degree[n as usize] == 0)
            .collect()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            pred_ptr: vec![0],
            pred_idx: Vec::new(),
            out_degree: Vec::new(),
        }
    }
}
