//! Solver configuration
//!
//! A [`SolverConfig`] holds every tunable of a PageRank run. It can be built
//! in code with the `with_*` setters or loaded from JSON.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "damping": 0.85,
//!   "tolerance": 1e-9,
//!   "max_iterations": 200,
//!   "dangling": "drop",
//!   "threads": 8,
//!   "progress_every": 10
//! }
//! ```
//!
//! Omitted fields take their defaults; unknown fields are rejected.

use serde::{Deserialize, Serialize};

use crate::error::{PageRankError, Result};

/// What happens to the mass sitting on nodes without outgoing edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    /// Dangling mass leaves the system each iteration; the vector sum decays
    #[default]
    Drop,
    /// Dangling mass is teleported according to the restart distribution
    Restart,
    /// Dangling mass is spread evenly over all nodes
    Uniform,
}

impl DanglingPolicy {
    /// Returns the name used in JSON and in the solve span.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Restart => "restart",
            Self::Uniform => "uniform",
        }
    }
}

/// Tunables for one PageRank run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Probability of following an edge, in `(0, 1)`
    pub damping: f64,
    /// L1 distance between successive vectors below which the run converges
    pub tolerance: f64,
    /// Iteration budget
    pub max_iterations: usize,
    /// Dangling-node policy
    pub dangling: DanglingPolicy,
    /// Worker threads for the per-node update; `None` uses the global pool
    pub threads: Option<usize>,
    /// Emit a progress event every this many iterations; 0 disables
    pub progress_every: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-9,
            max_iterations: 200,
            dangling: DanglingPolicy::Drop,
            threads: None,
            progress_every: 10,
        }
    }
}

impl SolverConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for a narrow personalized restart set
    ///
    /// Teleportation dominates (damping 0.15) so rankings lean strongly
    /// toward the topic.
    pub fn topic() -> Self {
        Self {
            damping: 0.15,
            ..Self::default()
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the dangling-node policy
    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.dangling = dangling;
        self
    }

    /// Run on a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the progress event interval
    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every;
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against its domain
    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(PageRankError::InvalidParameter(format!(
                "damping must lie in (0, 1), got {}",
                self.damping
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(PageRankError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(PageRankError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(PageRankError::InvalidParameter(
                "threads must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
