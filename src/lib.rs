//! # topic-pagerank
//!
//! PageRank over large, dense-id link graphs such as the Wikipedia page-link
//! graph, with a topic-sensitive variant that concentrates teleportation on
//! the pages of chosen categories.
//!
//! ## Quick start
//!
//! ```
//! use topic_pagerank::prelude::*;
//!
//! let graph = Graph::build(vec![(0, 1), (1, 2), (2, 0), (3, 2)], 4).unwrap();
//! let result = pagerank(&graph, SolverConfig::default(), &CancellationToken::new()).unwrap();
//!
//! assert!(result.converged());
//! let best = result.top_n(1);
//! assert_eq!(best[0].0, 2);
//! ```
//!
//! ## Topic-sensitive ranking
//!
//! ```
//! use topic_pagerank::prelude::*;
//!
//! let graph = Graph::build(vec![(0, 1), (1, 0), (2, 3), (3, 2)], 4).unwrap();
//! let restart = RestartDistribution::personalized(vec![0]).unwrap();
//! let mut solver = PageRankSolver::new(&graph, restart, SolverConfig::topic()).unwrap();
//! let result = solver.run(&CancellationToken::new());
//!
//! assert!(result.scores[0] > result.scores[2]);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod observer;
pub mod pagerank;
pub mod report;
pub mod topic;

pub use config::{DanglingPolicy, SolverConfig};
pub use error::{PageRankError, Result};
pub use graph::{EdgeListBuilder, Graph};
pub use pagerank::{
    pagerank, personalized_pagerank, CancellationToken, PageRankResult, PageRankSolver,
    RestartDistribution, SolveStatus, SolverState,
};
pub use report::{scores_for, top_k, RankReporter, RankedEntry, TitleLookup};
pub use topic::{run_topic_experiments, CategoryIndex, TopicExperiment, TopicOutcome};

/// Commonly used types in one import
pub mod prelude {
    pub use crate::config::{DanglingPolicy, SolverConfig};
    pub use crate::error::{PageRankError, Result};
    pub use crate::graph::{EdgeListBuilder, Graph};
    pub use crate::observer::{IterationRecorder, NoopObserver, SolverObserver};
    pub use crate::pagerank::{
        pagerank, personalized_pagerank, CancellationToken, PageRankResult, PageRankSolver,
        RestartDistribution, SolveStatus,
    };
    pub use crate::report::{rank_subset, scores_for, top_k, RankReporter, TitleLookup};
    pub use crate::topic::{CategoryIndex, TopicExperiment};
}
