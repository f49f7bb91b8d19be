//! Ranking extraction
//!
//! Turns a rank vector into ordered `(node, score)` pairs, either the global
//! top-K or a fixed list of nodes of interest. Titles come from an external
//! [`TitleLookup`]; the reporter never owns or parses that data.

pub mod lookup;

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{PageRankError, Result};

pub use lookup::TitleLookup;

/// Descending by score, ascending by id on ties
fn rank_order(a: &(u32, f64), b: &(u32, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// The `k` highest-scoring nodes, best first
///
/// Returns exactly `min(k, scores.len())` entries. Ties are broken by
/// ascending node id, so the output is deterministic.
pub fn top_k(scores: &[f64], k: usize) -> Vec<(u32, f64)> {
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }

    let mut indexed: Vec<(u32, f64)> = scores
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as u32, s))
        .collect();

    // Partition the head before sorting it
    if k < indexed.len() {
        indexed.select_nth_unstable_by(k - 1, rank_order);
        indexed.truncate(k);
    }
    indexed.sort_unstable_by(rank_order);
    indexed
}

/// Scores of `ids`, in the order given
pub fn scores_for(scores: &[f64], ids: &[u32]) -> Result<Vec<(u32, f64)>> {
    ids.iter()
        .map(|&id| {
            scores
                .get(id as usize)
                .map(|&s| (id, s))
                .ok_or(PageRankError::InvalidNode {
                    node: id,
                    num_nodes: scores.len(),
                })
        })
        .collect()
}

/// Scores of `ids`, best first
///
/// Used to compare a fixed candidate set after a run; ties are broken by
/// ascending node id.
pub fn rank_subset(scores: &[f64], ids: &[u32]) -> Result<Vec<(u32, f64)>> {
    let mut picked = scores_for(scores, ids)?;
    picked.sort_by(rank_order);
    Ok(picked)
}

/// A ranked node with its display title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub id: u32,
    pub title: String,
    pub score: f64,
}

/// Resolves ranked node ids to titles through a [`TitleLookup`]
#[derive(Debug)]
pub struct RankReporter<'a, L: ?Sized> {
    titles: &'a L,
}

impl<'a, L: TitleLookup + ?Sized> RankReporter<'a, L> {
    pub fn new(titles: &'a L) -> Self {
        Self { titles }
    }

    /// Title of `id`, or `#<id>` when the lookup has none
    pub fn title(&self, id: u32) -> String {
        match self.titles.title(id) {
            Some(title) => title.to_string(),
            None => format!("#{id}"),
        }
    }

    /// The `k` highest-scoring nodes with their titles
    pub fn top_titles(&self, scores: &[f64], k: usize) -> Vec<RankedEntry> {
        top_k(scores, k)
            .into_iter()
            .map(|(id, score)| self.entry(id, score))
            .collect()
    }

    /// Titled scores of `ids`, in the order given
    pub fn titled_scores(&self, scores: &[f64], ids: &[u32]) -> Result<Vec<RankedEntry>> {
        Ok(scores_for(scores, ids)?
            .into_iter()
            .map(|(id, score)| self.entry(id, score))
            .collect())
    }

    fn entry(&self, id: u32, score: f64) -> RankedEntry {
        RankedEntry {
            id,
            title: self.title(id),
            score,
        }
    }
}
