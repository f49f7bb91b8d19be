//! Topic-sensitive ranking
//!
//! A topic is a keyword matched against category labels. The pages of every
//! matching category form the restart subset of a personalized run, and a
//! fixed list of candidate pages is ranked under each topic.
//!
//! Process:
//! 1. Match the keyword against category labels (case-insensitive)
//! 2. Union the member pages of the matching categories
//! 3. Run personalized PageRank restarting on that union
//! 4. Rank the candidate pages by their topic score

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SolverConfig;
use crate::error::{PageRankError, Result};
use crate::graph::Graph;
use crate::pagerank::{
    CancellationToken, PageRankResult, PageRankSolver, RestartDistribution,
};
use crate::report;

/// Read-only mapping from category label to member node ids
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    categories: FxHashMap<String, FxHashSet<u32>>,
}

impl CategoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing label -> members map
    pub fn from_map(categories: FxHashMap<String, FxHashSet<u32>>) -> Self {
        Self { categories }
    }

    /// Add `ids` to the category `label`, creating it if needed
    pub fn insert<I>(&mut self, label: impl Into<String>, ids: I)
    where
        I: IntoIterator<Item = u32>,
    {
        self.categories.entry(label.into()).or_default().extend(ids);
    }

    /// Members of `label`, if the category exists
    pub fn get(&self, label: &str) -> Option<&FxHashSet<u32>> {
        self.categories.get(label)
    }

    /// All labels, sorted
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Check if the index has no categories
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Labels containing `keyword`, ignoring case, sorted
    pub fn matching_labels(&self, keyword: &str) -> Vec<&str> {
        let needle = keyword.to_lowercase();
        let mut labels: Vec<&str> = self
            .categories
            .keys()
            .filter(|label| label.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Union of the members of every category matching `keyword`
    pub fn members_matching(&self, keyword: &str) -> FxHashSet<u32> {
        let mut members = FxHashSet::default();
        for label in self.matching_labels(keyword) {
            if let Some(ids) = self.categories.get(label) {
                members.extend(ids.iter().copied());
            }
        }
        members
    }

    /// Restart distribution over the pages of every category matching `keyword`
    ///
    /// Fails with [`EmptySubset`](crate::PageRankError::EmptySubset) when no
    /// category matches or the matches have no members.
    pub fn restart_for(&self, keyword: &str) -> Result<RestartDistribution> {
        RestartDistribution::personalized(self.members_matching(keyword))
    }
}

/// One topic run: a keyword and the candidate pages to compare under it
#[derive(Debug, Clone)]
pub struct TopicExperiment {
    pub keyword: String,
    pub candidates: Vec<u32>,
}

impl TopicExperiment {
    pub fn new(keyword: impl Into<String>, candidates: Vec<u32>) -> Self {
        Self {
            keyword: keyword.into(),
            candidates,
        }
    }

    /// Fail with [`InvalidNode`](PageRankError::InvalidNode) on the first
    /// candidate outside `[0, num_nodes)`
    pub fn check_candidates(&self, num_nodes: usize) -> Result<()> {
        match self.candidates.iter().find(|&&id| id as usize >= num_nodes) {
            Some(&node) => Err(PageRankError::InvalidNode { node, num_nodes }),
            None => Ok(()),
        }
    }
}

/// Outcome of one topic run
#[derive(Debug, Clone)]
pub struct TopicOutcome {
    pub keyword: String,
    /// Full result of the personalized run
    pub result: PageRankResult,
    /// Candidate scores, best first
    pub candidate_scores: Vec<(u32, f64)>,
}

/// Run every experiment over the shared `graph`, in parallel
///
/// All restart sets and candidate ids are resolved and validated before any
/// solve starts, so a bad experiment fails the whole batch up front.
/// `config.threads` bounds the whole batch: experiments share one pool
/// rather than each building their own. Outcomes are returned in experiment
/// order.
pub fn run_topic_experiments(
    graph: &Graph,
    index: &CategoryIndex,
    experiments: &[TopicExperiment],
    config: &SolverConfig,
    cancel: &CancellationToken,
) -> Result<Vec<TopicOutcome>> {
    let prepared = prepare_experiments(graph, index, experiments, config)?;

    let run_all = || -> Result<Vec<TopicOutcome>> {
        prepared
            .into_par_iter()
            .map(|(experiment, mut solver)| {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    keyword = %experiment.keyword,
                    restart_nodes = solver.restart().support_len(),
                    "running topic experiment"
                );

                let result = solver.run(cancel);
                let candidate_scores =
                    report::rank_subset(&result.scores, &experiment.candidates)?;
                Ok(TopicOutcome {
                    keyword: experiment.keyword.clone(),
                    result,
                    candidate_scores,
                })
            })
            .collect()
    };

    match config.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(run_all),
        None => run_all(),
    }
}

/// Build one solver per experiment without running any of them
///
/// Solvers get no pool of their own; the caller decides where they run.
fn prepare_experiments<'a, 'g>(
    graph: &'g Graph,
    index: &CategoryIndex,
    experiments: &'a [TopicExperiment],
    config: &SolverConfig,
) -> Result<Vec<(&'a TopicExperiment, PageRankSolver<'g>)>> {
    config.validate()?;
    let solver_config = SolverConfig {
        threads: None,
        ..config.clone()
    };

    let mut prepared = Vec::with_capacity(experiments.len());
    for experiment in experiments {
        experiment.check_candidates(graph.num_nodes())?;
        let restart = index.restart_for(&experiment.keyword)?;
        let solver = PageRankSolver::new(graph, restart, solver_config.clone())?;
        prepared.push((experiment, solver));
    }
    Ok(prepared)
}
