//! Solver observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at iteration boundaries without coupling
//! to the iteration logic. Use cases include progress reporting, recording
//! the convergence curve, and timing runs.

use std::time::{Duration, Instant};

use crate::pagerank::{PageRankResult, SolveStatus};

/// Callbacks invoked by [`PageRankSolver`](crate::pagerank::solver::PageRankSolver)
///
/// Every method has an empty default, so implementors override only what
/// they need. Observers travel into the solver's worker pool, hence `Send`.
pub trait SolverObserver: Send {
    /// Called once before the first iteration.
    fn on_start(&mut self, _num_nodes: usize) {}

    /// Called after each completed iteration with the L1 distance it moved.
    fn on_iteration(&mut self, _iteration: usize, _delta: f64) {}

    /// Called once with the final result.
    fn on_finish(&mut self, _result: &PageRankResult) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SolverObserver for NoopObserver {}

/// Observer that records the convergence curve and wall-clock time
#[derive(Debug, Default)]
pub struct IterationRecorder {
    started: Option<Instant>,
    deltas: Vec<f64>,
    elapsed: Option<Duration>,
    status: Option<SolveStatus>,
}

impl IterationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// L1 distances in iteration order
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    /// Wall-clock time between start and finish, once finished
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Final status, once finished
    pub fn status(&self) -> Option<SolveStatus> {
        self.status
    }
}

impl SolverObserver for IterationRecorder {
    fn on_start(&mut self, _num_nodes: usize) {
        self.started = Some(Instant::now());
        self.deltas.clear();
        self.elapsed = None;
        self.status = None;
    }

    fn on_iteration(&mut self, _iteration: usize, delta: f64) {
        self.deltas.push(delta);
    }

    fn on_finish(&mut self, result: &PageRankResult) {
        self.elapsed = self.started.map(|s| s.elapsed());
        self.status = Some(result.status);
    }
}
