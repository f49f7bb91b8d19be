//! Incremental edge-list builder
//!
//! Edges are validated and degree-counted as they arrive, so the conversion
//! to CSR needs no second scan of the input stream.

use crate::error::{PageRankError, Result};

/// Largest supported node count; every id in `[0, MAX_NODES)` fits a `u32`
pub const MAX_NODES: usize = u32::MAX as usize;

/// A mutable edge collector for a graph of fixed size
#[derive(Debug, Clone)]
pub struct EdgeListBuilder {
    num_nodes: usize,
    /// Edges in arrival order
    edges: Vec<(u32, u32)>,
    /// Out-degree per node, counted per edge occurrence
    out_degree: Vec<u32>,
    /// In-degree per node, counted per edge occurrence
    in_degree: Vec<u32>,
}

impl EdgeListBuilder {
    /// Create an empty builder for `num_nodes` nodes
    ///
    /// Fails with [`InvalidParameter`](PageRankError::InvalidParameter) when
    /// `num_nodes` exceeds [`MAX_NODES`].
    pub fn new(num_nodes: usize) -> Result<Self> {
        Self::with_capacity(num_nodes, 0)
    }

    /// Create a builder with room for `edge_capacity` edges
    pub fn with_capacity(num_nodes: usize, edge_capacity: usize) -> Result<Self> {
        if num_nodes > MAX_NODES {
            return Err(PageRankError::InvalidParameter(format!(
                "graph of {num_nodes} nodes exceeds the u32 id space ({MAX_NODES} nodes)"
            )));
        }

        Ok(Self {
            num_nodes,
            edges: Vec::with_capacity(edge_capacity),
            out_degree: vec![0; num_nodes],
            in_degree: vec![0; num_nodes],
        })
    }

    /// Add a directed edge `from -> to`
    ///
    /// Multi-edges and self-loops are kept; each occurrence counts once
    /// toward the source's out-degree.
    pub fn add_edge(&mut self, from: u32, to: u32) -> Result<()> {
        if from as usize >= self.num_nodes || to as usize >= self.num_nodes {
            return Err(PageRankError::InvalidEdge {
                from,
                to,
                num_nodes: self.num_nodes,
            });
        }

        self.out_degree[from as usize] += 1;
        self.in_degree[to as usize] += 1;
        self.edges.push((from, to));
        Ok(())
    }

    /// Add every edge of `edges`, stopping at the first invalid one
    pub fn extend<I>(&mut self, edges: I) -> Result<()>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let iter = edges.into_iter();
        self.edges.reserve(iter.size_hint().0);
        for (from, to) in iter {
            self.add_edge(from, to)?;
        }
        Ok(())
    }

    /// Number of nodes the graph will have
    pub fn node_count(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges collected so far
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges collected so far, in arrival order
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Out-degree counts collected so far
    pub fn out_degrees(&self) -> &[u32] {
        &self.out_degree
    }

    /// In-degree counts collected so far
    pub fn in_degrees(&self) -> &[u32] {
        &self.in_degree
    }

    /// Check if no edges have been added
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
