//! Error types
//!
//! Fatal conditions surface as [`PageRankError`]. Running out of iterations
//! or being cancelled is not an error: see
//! [`SolveStatus`](crate::pagerank::SolveStatus).

use thiserror::Error;

/// Errors raised while building a graph, a restart distribution, or a solver
#[derive(Debug, Error)]
pub enum PageRankError {
    /// An edge endpoint lies outside `[0, num_nodes)`
    #[error("edge {from} -> {to} is out of range for a graph of {num_nodes} nodes")]
    InvalidEdge {
        from: u32,
        to: u32,
        num_nodes: usize,
    },

    /// A personalized restart was requested over zero nodes
    #[error("personalized restart distribution requires at least one node")]
    EmptySubset,

    /// A node id referenced outside of an edge lies outside `[0, num_nodes)`
    #[error("node {node} is out of range for a graph of {num_nodes} nodes")]
    InvalidNode { node: u32, num_nodes: usize },

    /// A solver parameter lies outside its domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A JSON configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A dedicated worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, PageRankError>;
