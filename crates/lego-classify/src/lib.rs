//! The classifier framework and the ≈20 rule-based classifiers that turn a
//! page's extracted blocks into a typed `LegoPageElement` tree
//! (`spec.md` §2 item 6, §4.1, §4.2).
//!
//! `classifier` defines the contract every classifier implements;
//! `classifiers` holds the individual rule-based classifiers grouped by kind
//! (text-pattern, geometry, composite); `pipeline` drives dependency
//! ordering, scoring, solving, and building; `spatial` resolves the
//! spatially-assigned fields the schema generator leaves unbound.

pub mod classifier;
pub mod classifiers;
pub mod pipeline;
pub mod spatial;

pub use classifier::Classifier;
pub use classifiers::all_classifiers;
pub use pipeline::ClassifierPipeline;
