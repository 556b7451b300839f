//! Schema-driven constraint generation, a hand-rolled CP-SAT-style boolean
//! solver, and post-solve spatial assignment for the LEGO page classifier.
//!
//! See `SPEC_FULL.md` §2: analogous in spirit to
//! `docling-pdf-ml::pipeline::table_inference` (assignment) and
//! `pipeline_modular::stage08_overlap_resolver` (grouping/selection under
//! constraints), generalized into a standalone solver independent of any one
//! pipeline stage.

pub mod assignment;
pub mod config;
pub mod engine;
pub mod schema;
pub mod solve;

pub use assignment::{assign, center_distance_cost, PoolMember, Slot};
pub use config::{SolverConfig, SolverConfigBuilder, SolverLabels};
pub use engine::{Cardinality, Constraint, ConstraintModel, ModelVar, SolveOutcome};
pub use solve::{solve_page, solve_page_excluding};
