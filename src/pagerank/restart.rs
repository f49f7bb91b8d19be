//! Restart (teleport) distributions
//!
//! Teleported mass lands either uniformly on every node or uniformly on a
//! chosen subset. Topic-sensitive PageRank uses the subset form, built from
//! the pages of one or more categories.

use crate::error::{PageRankError, Result};

/// Where teleported random-surfer mass lands
#[derive(Debug, Clone, PartialEq)]
pub enum RestartDistribution {
    /// Weight `1/num_nodes` on every node
    Uniform { num_nodes: usize },
    /// Weight `1/|members|` on each member, zero elsewhere
    ///
    /// Members are sorted and deduplicated.
    Subset { members: Vec<u32> },
}

impl RestartDistribution {
    /// Uniform restart over `num_nodes` nodes
    pub fn uniform(num_nodes: usize) -> Self {
        Self::Uniform { num_nodes }
    }

    /// Uniform restart over a subset of nodes
    ///
    /// Duplicate ids collapse into one member. Fails with
    /// [`EmptySubset`](PageRankError::EmptySubset) if no ids are given.
    pub fn personalized<I>(subset: I) -> Result<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut members: Vec<u32> = subset.into_iter().collect();
        if members.is_empty() {
            return Err(PageRankError::EmptySubset);
        }
        members.sort_unstable();
        members.dedup();
        Ok(Self::Subset { members })
    }

    /// Check if this is the uniform variant
    pub fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform { .. })
    }

    /// Number of nodes that receive restart mass
    pub fn support_len(&self) -> usize {
        match self {
            Self::Uniform { num_nodes } => *num_nodes,
            Self::Subset { members } => members.len(),
        }
    }

    /// Check if `node` receives restart mass
    pub fn contains(&self, node: u32) -> bool {
        match self {
            Self::Uniform { num_nodes } => (node as usize) < *num_nodes,
            Self::Subset { members } => members.binary_search(&node).is_ok(),
        }
    }

    /// Restart probability of `node`
    pub fn weight(&self, node: u32) -> f64 {
        if self.contains(node) {
            1.0 / self.support_len() as f64
        } else {
            0.0
        }
    }

    /// Check that this distribution fits a graph of `num_nodes` nodes
    pub fn check_compatible(&self, num_nodes: usize) -> Result<()> {
        match self {
            Self::Uniform { num_nodes: n } if *n != num_nodes => {
                Err(PageRankError::InvalidParameter(format!(
                    "uniform restart over {n} nodes used with a graph of {num_nodes} nodes"
                )))
            }
            Self::Uniform { .. } => Ok(()),
            Self::Subset { members } => match members.last() {
                Some(&max) if max as usize >= num_nodes => Err(PageRankError::InvalidNode {
                    node: max,
                    num_nodes,
                }),
                _ => Ok(()),
            },
        }
    }

    /// Materialize the dense probability vector over `num_nodes` nodes
    ///
    /// The caller must have checked compatibility first.
    pub fn to_dense(&self, num_nodes: usize) -> Vec<f64> {
        match self {
            Self::Uniform { .. } => vec![1.0 / num_nodes as f64; num_nodes],
            Self::Subset { members } => {
                let mut dense = vec![0.0; num_nodes];
                let share = 1.0 / members.len() as f64;
                for &node in members {
                    dense[node as usize] = share;
                }
                dense
            }
        }
    }
}
