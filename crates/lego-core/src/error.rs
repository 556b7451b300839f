//! Error types for the LEGO page classification core.
//!
//! All public APIs use the [`Result<T>`] alias, which wraps [`LegoError`]. Per the
//! error-handling design, errors fall into two classes: configuration errors are
//! fatal and raised at pipeline construction; everything else is a per-page,
//! recoverable condition that the pipeline degrades around rather than propagating.

use thiserror::Error;

/// Errors that can occur while building or running the classification core.
#[derive(Error, Debug)]
pub enum LegoError {
    /// Invalid classifier pipeline configuration, detected at construction time.
    ///
    /// Covers a missing classifier for a declared label, a `requires` dependency
    /// cycle, a duplicate output label, or an invalid solver configuration value
    /// (non-finite penalty, zero timeout, unknown solver label).
    #[error("invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// A block's bounding box violated the `x0 <= x1`, `y0 <= y1` invariant.
    ///
    /// The offending block is dropped from the page with a warning; this is never
    /// fatal to the page as a whole.
    #[error("block {block_id} has an invalid bounding box: {reason}")]
    InvalidBBox { block_id: u64, reason: String },

    /// A selected composite candidate could not be built because a child
    /// reference it depends on was not actually selected or built.
    #[error("failed to build candidate {candidate_id} ({label}): {reason}")]
    BuildFailed {
        candidate_id: u64,
        label: String,
        reason: String,
    },

    /// The constraint solver found no feasible selection for a page.
    #[error("solver found no feasible selection for page {page_index}")]
    SolverInfeasible { page_index: u32 },

    /// The constraint solver exceeded its per-page wall-clock budget.
    #[error("solver exceeded its time budget for page {page_index} after {elapsed_ms}ms")]
    SolverTimeout { page_index: u32, elapsed_ms: u64 },
}

/// Convenience alias used throughout the crate and its sibling crates.
pub type Result<T> = std::result::Result<T, LegoError>;
