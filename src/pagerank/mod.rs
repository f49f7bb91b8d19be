//! PageRank algorithms
//!
//! This module provides the damped power-iteration solver together with
//! its restart distributions and cancellation handle.

pub mod cancel;
pub mod restart;
pub mod solver;

use crate::config::SolverConfig;
use crate::error::Result;
use crate::graph::Graph;
use crate::report;

pub use cancel::CancellationToken;
pub use restart::RestartDistribution;
pub use solver::{PageRankSolver, SolverState};

/// How a solver run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The L1 distance dropped below the tolerance
    Converged,
    /// The iteration budget ran out first; scores are best effort
    NonConvergence,
    /// A cancellation request stopped the run; scores are best effort
    Cancelled,
}

impl SolveStatus {
    /// Name recorded on the termination event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::NonConvergence => "non_convergence",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Result of a PageRank computation
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// Scores for each node (indexed by node ID)
    pub scores: Vec<f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final convergence delta
    pub delta: f64,
    /// How the run ended
    pub status: SolveStatus,
}

impl PageRankResult {
    /// Create a new PageRank result
    pub fn new(scores: Vec<f64>, iterations: usize, delta: f64, status: SolveStatus) -> Self {
        Self {
            scores,
            iterations,
            delta,
            status,
        }
    }

    /// Whether the algorithm converged
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    /// Get top N nodes by score, ties broken by ascending node id
    pub fn top_n(&self, n: usize) -> Vec<(u32, f64)> {
        report::top_k(&self.scores, n)
    }

    /// Get the score for a specific node
    pub fn score(&self, node: u32) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }

    /// Total mass left in the vector
    pub fn total_mass(&self) -> f64 {
        self.scores.iter().sum()
    }
}

/// Run PageRank with a uniform restart distribution
pub fn pagerank(
    graph: &Graph,
    config: SolverConfig,
    cancel: &CancellationToken,
) -> Result<PageRankResult> {
    let restart = RestartDistribution::uniform(graph.num_nodes());
    let mut solver = PageRankSolver::new(graph, restart, config)?;
    Ok(solver.run(cancel))
}

/// Run topic-sensitive PageRank restarting uniformly over `subset`
pub fn personalized_pagerank<I>(
    graph: &Graph,
    subset: I,
    config: SolverConfig,
    cancel: &CancellationToken,
) -> Result<PageRankResult>
where
    I: IntoIterator<Item = u32>,
{
    let restart = RestartDistribution::personalized(subset)?;
    let mut solver = PageRankSolver::new(graph, restart, config)?;
    Ok(solver.run(cancel))
}
