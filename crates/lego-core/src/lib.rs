//! Geometry, block, element, and candidate types shared by the LEGO assembly
//! instruction page classifier.
//!
//! This crate has no pipeline logic of its own — it is the data model
//! `lego-classify`'s classifiers and `lego-solver`'s constraint engine both
//! build on. See `SPEC_FULL.md` §2-§4 for the module map this mirrors.

pub mod block;
pub mod candidate;
pub mod constraint;
pub mod element;
pub mod error;
pub mod geometry;
pub mod hints;
pub mod report;
pub mod result;

pub use block::{Block, BlockId, PageData};
pub use candidate::{Candidate, CandidateId, CandidateRef, HasElementKind, ScoreDetails};
pub use constraint::SemanticConstraint;
pub use element::{ElementKind, LegoPageElement};
pub use error::{LegoError, Result};
pub use geometry::BBox;
pub use hints::{DocumentHints, FontHistogram};
pub use report::{CandidateRecord, ClassificationReport};
pub use result::{CandidateState, ClassificationResult, StoredCandidate};
