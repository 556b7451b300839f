//! `SolverConfig`: the host-supplied knobs the constraint engine runs under.
//!
//! Built through [`SolverConfigBuilder`], mirroring the teacher's
//! `PipelineConfigBuilder` preset + step-by-step style
//! (`docling-pdf-ml::pipeline::executor`). `unconsumed_penalty` has no
//! implicit default on the builder — per `spec.md` §9 (iii), score
//! calibration across classifiers is not uniform, so the penalty must be
//! supplied and tuned against the documented scenarios rather than guessed.

use lego_core::{LegoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Which labels participate in the constraint solver; labels outside fall
/// back to greedy highest-score-first selection (see `spec.md` §4.4,
/// "per-label opt-in").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverLabels {
    All,
    Only(HashSet<String>),
}

impl SolverLabels {
    #[must_use]
    pub fn participates(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(labels) => labels.contains(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub use_solver: bool,
    pub solver_labels: SolverLabels,
    pub unconsumed_penalty: f64,
    pub per_page_timeout: Duration,
    pub build_retry_budget: u32,
}

/// Builds a [`SolverConfig`], validating it at `build()` rather than letting
/// a malformed config reach the solver at page-classification time (a
/// configuration error per `spec.md` §7, fatal and raised at construction).
#[derive(Debug, Clone)]
pub struct SolverConfigBuilder {
    use_solver: bool,
    solver_labels: SolverLabels,
    unconsumed_penalty: f64,
    per_page_timeout: Duration,
    build_retry_budget: u32,
}

impl SolverConfigBuilder {
    /// Start a builder. `unconsumed_penalty` (λ) has no default — callers
    /// must supply one appropriate to their label set's score calibration.
    #[must_use]
    pub fn new(unconsumed_penalty: f64) -> Self {
        Self {
            use_solver: true,
            solver_labels: SolverLabels::All,
            unconsumed_penalty,
            per_page_timeout: Duration::from_secs(3),
            build_retry_budget: 3,
        }
    }

    /// Every label solver-participating, a several-second per-page timeout,
    /// and a build-retry budget of 3 (matching the teacher's
    /// `max_iterations: 3` default in `ModularPipeline::new`).
    #[must_use]
    pub fn default_all(unconsumed_penalty: f64) -> Self {
        Self::new(unconsumed_penalty)
    }

    /// `use_solver = false`: every label falls back to greedy
    /// highest-score-first selection. Useful for A/B comparison against the
    /// full solver.
    #[must_use]
    pub fn greedy_only(unconsumed_penalty: f64) -> Self {
        let mut builder = Self::new(unconsumed_penalty);
        builder.use_solver = false;
        builder
    }

    #[must_use]
    pub fn use_solver(mut self, use_solver: bool) -> Self {
        self.use_solver = use_solver;
        self
    }

    #[must_use]
    pub fn solver_labels(mut self, labels: SolverLabels) -> Self {
        self.solver_labels = labels;
        self
    }

    #[must_use]
    pub fn per_page_timeout(mut self, timeout: Duration) -> Self {
        self.per_page_timeout = timeout;
        self
    }

    #[must_use]
    pub fn build_retry_budget(mut self, budget: u32) -> Self {
        self.build_retry_budget = budget;
        self
    }

    /// Validate and produce the final config. λ must be finite and
    /// non-negative, the timeout non-zero, and every label named in
    /// `solver_labels` must appear in `declared_labels`.
    pub fn build(self, declared_labels: &[&str]) -> Result<SolverConfig> {
        if !self.unconsumed_penalty.is_finite() || self.unconsumed_penalty < 0.0 {
            return Err(LegoError::ConfigError {
                reason: format!(
                    "unconsumed_penalty must be finite and non-negative, got {}",
                    self.unconsumed_penalty
                ),
            });
        }
        if self.per_page_timeout.is_zero() {
            return Err(LegoError::ConfigError {
                reason: "per_page_timeout must be non-zero".to_string(),
            });
        }
        if let SolverLabels::Only(labels) = &self.solver_labels {
            for label in labels {
                if !declared_labels.contains(&label.as_str()) {
                    return Err(LegoError::ConfigError {
                        reason: format!("solver_labels references undeclared label '{label}'"),
                    });
                }
            }
        }
        Ok(SolverConfig {
            use_solver: self.use_solver,
            solver_labels: self.solver_labels,
            unconsumed_penalty: self.unconsumed_penalty,
            per_page_timeout: self.per_page_timeout,
            build_retry_budget: self.build_retry_budget,
        })
    }
}
