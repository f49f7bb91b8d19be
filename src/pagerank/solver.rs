//! Damped power-iteration solver
//!
//! Each iteration computes, for every node `i`,
//!
//! ```text
//! next[i] = d * Σ_{j → i} v[j] / out_degree[j] + (1 - d) * restart[i] + dangling share
//! ```
//!
//! and stops once the L1 distance between successive vectors falls below the
//! tolerance. The per-node update runs on the rayon pool; every node reads
//! its predecessors in stored order and all reductions combine fixed-size
//! chunks in index order, so output is bit-identical across thread counts.

use rayon::prelude::*;

use super::cancel::CancellationToken;
use super::restart::RestartDistribution;
use super::{PageRankResult, SolveStatus};
use crate::config::{DanglingPolicy, SolverConfig};
use crate::error::Result;
use crate::graph::Graph;
use crate::observer::{NoopObserver, SolverObserver};

/// Elements per partial sum in deterministic reductions
const REDUCE_CHUNK: usize = 4096;

/// Minimum nodes handed to one worker in the per-node update
const MIN_NODES_PER_TASK: usize = 1024;

/// Enter a tracing span for a solver run (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_solve {
    ($nodes:expr, $restart:expr, $dangling:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "pagerank_solve",
            nodes = $nodes,
            restart_support = $restart,
            dangling = $dangling
        )
        .entered();
    };
}

/// Lifecycle of a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Constructed, not yet run
    Initialized,
    /// Inside the iteration loop
    Iterating,
    /// Last run met the tolerance
    Converged,
    /// Last run stopped early, by cancellation or by the iteration budget
    Cancelled,
}

/// PageRank solver over a shared, read-only graph
///
/// Each solver owns its restart distribution and rank buffers, so any
/// number of solvers may run concurrently over the same [`Graph`].
#[derive(Debug)]
pub struct PageRankSolver<'g> {
    graph: &'g Graph,
    restart: RestartDistribution,
    config: SolverConfig,
    pool: Option<rayon::ThreadPool>,
    state: SolverState,
}

impl<'g> PageRankSolver<'g> {
    /// Create a solver, validating the configuration and the restart
    /// distribution against the graph
    pub fn new(
        graph: &'g Graph,
        restart: RestartDistribution,
        config: SolverConfig,
    ) -> Result<Self> {
        config.validate()?;
        restart.check_compatible(graph.num_nodes())?;

        let pool = match config.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?,
            ),
            None => None,
        };

        Ok(Self {
            graph,
            restart,
            config,
            pool,
            state: SolverState::Initialized,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn restart(&self) -> &RestartDistribution {
        &self.restart
    }

    /// Run to convergence, budget exhaustion, or cancellation
    ///
    /// Always returns a vector; check [`PageRankResult::status`] before
    /// trusting it.
    pub fn run(&mut self, cancel: &CancellationToken) -> PageRankResult {
        self.run_with_observer(cancel, &mut NoopObserver)
    }

    /// Same as [`run`](Self::run), notifying `observer` at each iteration
    pub fn run_with_observer(
        &mut self,
        cancel: &CancellationToken,
        observer: &mut impl SolverObserver,
    ) -> PageRankResult {
        trace_solve!(
            self.graph.num_nodes(),
            self.restart.support_len(),
            self.config.dangling.as_str()
        );

        observer.on_start(self.graph.num_nodes());
        self.state = SolverState::Iterating;

        let result = match self.pool.take() {
            Some(pool) => {
                let result = pool.install(|| self.iterate(cancel, &mut *observer));
                self.pool = Some(pool);
                result
            }
            None => self.iterate(cancel, observer),
        };

        self.state = match result.status {
            SolveStatus::Converged => SolverState::Converged,
            SolveStatus::NonConvergence | SolveStatus::Cancelled => SolverState::Cancelled,
        };

        #[cfg(feature = "tracing")]
        match result.status {
            SolveStatus::Converged => tracing::info!(
                status = result.status.as_str(),
                iterations = result.iterations,
                delta = result.delta,
                "pagerank converged"
            ),
            SolveStatus::NonConvergence => tracing::warn!(
                status = result.status.as_str(),
                iterations = result.iterations,
                delta = result.delta,
                tolerance = self.config.tolerance,
                "pagerank hit iteration budget before converging"
            ),
            SolveStatus::Cancelled => tracing::info!(
                status = result.status.as_str(),
                iterations = result.iterations,
                delta = result.delta,
                "pagerank cancelled"
            ),
        }

        observer.on_finish(&result);
        result
    }

    fn iterate(
        &self,
        cancel: &CancellationToken,
        observer: &mut impl SolverObserver,
    ) -> PageRankResult {
        let graph = self.graph;
        let n = graph.num_nodes();
        if n == 0 {
            return PageRankResult::new(vec![], 0, 0.0, SolveStatus::Converged);
        }

        let damping = self.config.damping;
        let restart = self.restart.to_dense(n);
        let dangling_nodes = graph.dangling_nodes();
        let inv_out_degree: Vec<f64> = graph
            .out_degrees()
            .iter()
            .map(|&d| if d > 0 { 1.0 / d as f64 } else { 0.0 })
            .collect();

        // Initialize scores uniformly
        let mut scores = vec![1.0 / n as f64; n];
        let mut new_scores = vec![0.0; n];
        let mut iterations = 0;
        let mut delta = f64::INFINITY;

        let status = loop {
            if cancel.is_cancelled() {
                break SolveStatus::Cancelled;
            }
            if iterations >= self.config.max_iterations {
                break SolveStatus::NonConvergence;
            }

            let dangling_mass = match self.config.dangling {
                DanglingPolicy::Drop => 0.0,
                DanglingPolicy::Restart | DanglingPolicy::Uniform => {
                    damping * gather_sum(&scores, &dangling_nodes)
                }
            };
            let (restart_scale, uniform_share) = match self.config.dangling {
                DanglingPolicy::Drop => (1.0 - damping, 0.0),
                DanglingPolicy::Restart => (1.0 - damping + dangling_mass, 0.0),
                DanglingPolicy::Uniform => (1.0 - damping, dangling_mass / n as f64),
            };

            let current = &scores;
            new_scores
                .par_iter_mut()
                .with_min_len(MIN_NODES_PER_TASK)
                .enumerate()
                .for_each(|(node, slot)| {
                    let inflow: f64 = graph
                        .predecessors(node as u32)
                        .iter()
                        .map(|&j| current[j as usize] * inv_out_degree[j as usize])
                        .sum();
                    *slot = damping * inflow + restart_scale * restart[node] + uniform_share;
                });

            delta = l1_distance(&scores, &new_scores);
            std::mem::swap(&mut scores, &mut new_scores);
            iterations += 1;

            observer.on_iteration(iterations, delta);
            #[cfg(feature = "tracing")]
            if self.config.progress_every > 0 && iterations % self.config.progress_every == 0 {
                tracing::debug!(iteration = iterations, delta, "finished iteration");
            }

            if delta < self.config.tolerance {
                break SolveStatus::Converged;
            }
        };

        PageRankResult::new(scores, iterations, delta, status)
    }
}

/// Sum of `values[i]` over `indices`, reduced in a fixed order
fn gather_sum(values: &[f64], indices: &[u32]) -> f64 {
    let partials: Vec<f64> = indices
        .par_chunks(REDUCE_CHUNK)
        .map(|chunk| chunk.iter().map(|&i| values[i as usize]).sum::<f64>())
        .collect();
    partials.iter().sum()
}

/// L1 distance between two equal-length vectors, reduced in a fixed order
fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    let partials: Vec<f64> = a
        .par_chunks(REDUCE_CHUNK)
        .zip(b.par_chunks(REDUCE_CHUNK))
        .map(|(x, y)| {
            x.iter()
                .zip(y.iter())
                .map(|(old, new)| (old - new).abs())
                .sum::<f64>()
        })
        .collect();
    partials.iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageRankError;
    use crate::observer::IterationRecorder;

    fn build_triangle_graph() -> Graph {
        Graph::build(vec![(0, 1), (1, 2), (2, 0)], 3).unwrap()
    }

    fn build_star_graph() -> Graph {
        // Three spokes pointing at a hub, hub points back at spoke 1
        Graph::build(vec![(1, 0), (2, 0), (3, 0), (0, 1)], 4).unwrap()
    }

    /// Pseudo-random graph with dangling nodes, deterministic per seed
    fn build_scrambled_graph(n: u32, edges: usize, seed: u64) -> Graph {
        let mut state = seed;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        let mut pairs = Vec::with_capacity(edges);
        for _ in 0..edges {
            let from = (next() % n as u64) as u32;
            let to = (next() % n as u64) as u32;
            // Leave the top tenth of ids without outgoing edges
            if from < n - n / 10 {
                pairs.push((from, to));
            }
        }
        Graph::build(pairs, n as usize).unwrap()
    }

    fn solve(graph: &Graph, restart: RestartDistribution, config: SolverConfig) -> PageRankResult {
        let mut solver = PageRankSolver::new(graph, restart, config).unwrap();
        solver.run(&CancellationToken::new())
    }

    #[test]
    fn test_triangle_graph_equal_scores() {
        let graph = build_triangle_graph();
        let result = solve(
            &graph,
            RestartDistribution::uniform(3),
            SolverConfig::default(),
        );

        assert!(result.converged());
        let expected = 1.0 / 3.0;
        for score in &result.scores {
            assert!((score - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_graph_hub_highest() {
        let graph = build_star_graph();
        let result = solve(
            &graph,
            RestartDistribution::uniform(4),
            SolverConfig::default(),
        );

        assert!(result.converged());
        let hub_score = result.scores[0];
        for &score in &result.scores[1..] {
            assert!(hub_score > score);
        }
    }

    #[test]
    fn test_sink_outranks_source() {
        let graph = Graph::build(vec![(0, 1)], 2).unwrap();
        let result = solve(
            &graph,
            RestartDistribution::uniform(2),
            SolverConfig::default(),
        );

        assert!(result.converged());
        assert!(result.scores[1] > result.scores[0]);
        // Source only ever receives teleported mass
        assert!((result.scores[0] - 0.15 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_nodes_converge_to_restart_in_one_iteration() {
        let graph = Graph::build(Vec::new(), 5).unwrap();
        let config = SolverConfig::default().with_dangling(DanglingPolicy::Restart);
        let result = solve(&graph, RestartDistribution::uniform(5), config);

        assert!(result.converged());
        assert_eq!(result.iterations, 1);
        for &score in &result.scores {
            assert!((score - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_isolated_nodes_lose_mass_when_dropping() {
        let graph = Graph::build(Vec::new(), 4).unwrap();
        let result = solve(
            &graph,
            RestartDistribution::uniform(4),
            SolverConfig::default(),
        );

        assert!(result.converged());
        // Every node keeps only its teleported share
        for &score in &result.scores {
            assert!((score - 0.15 / 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mass_accounts_for_dangling_loss() {
        let graph = build_scrambled_graph(200, 800, 7);
        let dangling = graph.dangling_nodes();
        let result = solve(
            &graph,
            RestartDistribution::uniform(200),
            SolverConfig::default().with_tolerance(1e-13).with_max_iterations(1000),
        );

        assert!(result.converged());
        assert!(result.scores.iter().all(|&s| s >= 0.0));

        // At the fixed point the vector reproduces itself: teleport adds
        // (1 - d), edges carry d of the non-dangling mass, dangling mass is lost.
        let total = result.total_mass();
        let dangling_mass: f64 = dangling.iter().map(|&d| result.scores[d as usize]).sum();
        assert!(dangling_mass > 0.0);
        assert!(total < 1.0);
        let balance = 0.15 + 0.85 * (total - dangling_mass);
        assert!((total - balance).abs() < 1e-9, "total={total} balance={balance}");
    }

    #[test]
    fn test_conserving_policies_sum_to_one() {
        let graph = build_scrambled_graph(150, 500, 11);
        for policy in [DanglingPolicy::Restart, DanglingPolicy::Uniform] {
            let result = solve(
                &graph,
                RestartDistribution::uniform(150),
                SolverConfig::default().with_dangling(policy),
            );
            assert!(result.converged());
            assert!((result.total_mass() - 1.0).abs() < 1e-9, "policy={policy:?}");
        }
    }

    #[test]
    fn test_restart_policy_routes_dangling_mass_to_subset() {
        // 0 -> 1, node 1 is dangling; restart only at node 0
        let graph = Graph::build(vec![(0, 1)], 3).unwrap();
        let restart = RestartDistribution::personalized(vec![0]).unwrap();
        let config = SolverConfig::default().with_dangling(DanglingPolicy::Restart);
        let result = solve(&graph, restart, config);

        assert!(result.converged());
        assert_eq!(result.scores[2], 0.0);
        assert!((result.total_mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_across_thread_counts() {
        let graph = build_scrambled_graph(20_000, 120_000, 42);
        let config = SolverConfig::default().with_max_iterations(30);

        let single = solve(
            &graph,
            RestartDistribution::uniform(20_000),
            config.clone().with_threads(1),
        );
        let multi = solve(
            &graph,
            RestartDistribution::uniform(20_000),
            config.clone().with_threads(4),
        );
        let again = solve(&graph, RestartDistribution::uniform(20_000), config);

        assert_eq!(single.iterations, multi.iterations);
        assert_eq!(single.delta.to_bits(), multi.delta.to_bits());
        for ((a, b), c) in single.scores.iter().zip(&multi.scores).zip(&again.scores) {
            assert_eq!(a.to_bits(), b.to_bits());
            assert_eq!(a.to_bits(), c.to_bits());
        }
    }

    #[test]
    fn test_personalized_bias_beats_symmetric_node() {
        // Two identical 2-cycles: 0 <-> 1 and 2 <-> 3
        let graph = Graph::build(vec![(0, 1), (1, 0), (2, 3), (3, 2)], 4).unwrap();
        let restart = RestartDistribution::personalized(vec![0]).unwrap();
        let result = solve(&graph, restart, SolverConfig::topic());

        assert!(result.converged());
        assert!(result.scores[0] > result.scores[2]);
        assert!(result.scores[1] > result.scores[3]);
        assert!(result.scores[0] > result.scores[1]);
    }

    #[test]
    fn test_max_iterations_returns_partial() {
        let graph = build_star_graph();
        let config = SolverConfig::default()
            .with_max_iterations(1)
            .with_tolerance(1e-300);
        let mut solver =
            PageRankSolver::new(&graph, RestartDistribution::uniform(4), config).unwrap();
        let result = solver.run(&CancellationToken::new());

        assert_eq!(result.iterations, 1);
        assert_eq!(result.status, SolveStatus::NonConvergence);
        assert_eq!(solver.state(), SolverState::Cancelled);
        assert_eq!(result.scores.len(), 4);
    }

    #[test]
    fn test_cancelled_before_start_returns_seed() {
        let graph = build_star_graph();
        let mut solver =
            PageRankSolver::new(&graph, RestartDistribution::uniform(4), SolverConfig::default())
                .unwrap();
        assert_eq!(solver.state(), SolverState::Initialized);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = solver.run(&cancel);

        assert_eq!(result.status, SolveStatus::Cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(solver.state(), SolverState::Cancelled);
        for &score in &result.scores {
            assert!((score - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cancel_from_observer_stops_at_boundary() {
        struct CancelAfter {
            token: CancellationToken,
            after: usize,
        }

        impl SolverObserver for CancelAfter {
            fn on_iteration(&mut self, iteration: usize, _delta: f64) {
                if iteration == self.after {
                    self.token.cancel();
                }
            }
        }

        let graph = build_scrambled_graph(500, 2000, 3);
        let token = CancellationToken::new();
        let mut observer = CancelAfter {
            token: token.clone(),
            after: 3,
        };
        let config = SolverConfig::default().with_tolerance(1e-300);
        let mut solver =
            PageRankSolver::new(&graph, RestartDistribution::uniform(500), config).unwrap();
        let result = solver.run_with_observer(&token, &mut observer);

        assert_eq!(result.status, SolveStatus::Cancelled);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let graph = build_star_graph();
        let mut recorder = IterationRecorder::new();
        let mut solver =
            PageRankSolver::new(&graph, RestartDistribution::uniform(4), SolverConfig::default())
                .unwrap();
        let result = solver.run_with_observer(&CancellationToken::new(), &mut recorder);

        assert_eq!(recorder.deltas().len(), result.iterations);
        assert_eq!(recorder.deltas().last().copied(), Some(result.delta));
        assert_eq!(recorder.status(), Some(SolveStatus::Converged));
        assert_eq!(solver.state(), SolverState::Converged);
    }

    #[test]
    fn test_damping_factor() {
        let graph = build_star_graph();

        let low = solve(
            &graph,
            RestartDistribution::uniform(4),
            SolverConfig::default().with_damping(0.5),
        );
        let high = solve(
            &graph,
            RestartDistribution::uniform(4),
            SolverConfig::default().with_damping(0.95),
        );

        // With higher damping, hub advantage should be more pronounced
        let hub_advantage_low = low.scores[0] - low.scores[2];
        let hub_advantage_high = high.scores[0] - high.scores[2];
        assert!(hub_advantage_high > hub_advantage_low);
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::default();
        let result = solve(
            &graph,
            RestartDistribution::uniform(0),
            SolverConfig::default(),
        );

        assert!(result.converged());
        assert!(result.scores.is_empty());
    }

    #[test]
    fn test_rejects_incompatible_restart() {
        let graph = build_triangle_graph();

        let subset = RestartDistribution::personalized(vec![3]).unwrap();
        let err = PageRankSolver::new(&graph, subset, SolverConfig::default()).unwrap_err();
        assert!(matches!(err, PageRankError::InvalidNode { node: 3, .. }));

        let uniform = RestartDistribution::uniform(4);
        let err = PageRankSolver::new(&graph, uniform, SolverConfig::default()).unwrap_err();
        assert!(matches!(err, PageRankError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let graph = build_triangle_graph();
        let err = PageRankSolver::new(
            &graph,
            RestartDistribution::uniform(3),
            SolverConfig::default().with_damping(1.5),
        )
        .unwrap_err();
        assert!(matches!(err, PageRankError::InvalidParameter(_)));
    }

    #[test]
    fn test_concurrent_solvers_share_graph() {
        let graph = build_scrambled_graph(300, 1500, 5);
        let restarts = vec![
            RestartDistribution::uniform(300),
            RestartDistribution::personalized(vec![1, 2, 3]).unwrap(),
            RestartDistribution::personalized(vec![100]).unwrap(),
        ];

        let sequential: Vec<_> = restarts
            .iter()
            .map(|r| solve(&graph, r.clone(), SolverConfig::topic()))
            .collect();
        let parallel: Vec<_> = restarts
            .par_iter()
            .map(|r| solve(&graph, r.clone(), SolverConfig::topic()))
            .collect();

        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.scores, b.scores);
        }
    }

    #[test]
    fn test_l1_distance_is_absolute() {
        // Signed differences cancel; the L1 distance must not
        let a = vec![0.5, 0.5];
        let b = vec![0.0, 1.0];
        assert!((l1_distance(&a, &b) - 1.0).abs() < 1e-12);
    }
}
