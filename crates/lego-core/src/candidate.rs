//! The candidate model: one scored, not-yet-committed guess that some set of
//! blocks forms some labeled element.
//!
//! A classifier never emits a [`LegoPageElement`](crate::element::LegoPageElement)
//! directly — it emits `Candidate`s, which the solver chooses among, and only the
//! *selected* candidates get built into elements. This indirection is what lets the
//! solver back out of a choice (see `spec.md` §9: candidates referencing other
//! candidates do so by `(label, CandidateId)` pair, never by storing a pointer into
//! another candidate or the tree being assembled, since either would alias data the
//! solver might still revise).

use crate::block::BlockId;
use crate::element::ElementKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::marker::PhantomData;

/// Identifies a candidate uniquely within one page's classification run.
pub type CandidateId = u64;

/// Maps a marker type to the [`ElementKind`] it stands for, so that
/// `Candidate<T>` carries its element type at compile time for classifier and
/// solver code, while [`Candidate::element_kind`] carries the same information
/// at run time for the schema constraint generator (which has no generic
/// parameter to inspect).
pub trait HasElementKind {
    const KIND: ElementKind;
}

/// A reference from one candidate's `score_details` to another candidate, by
/// the label it was emitted under and its id. Resolved through
/// [`crate::result::ClassificationResult`], never dereferenced directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRef {
    pub label: String,
    pub id: CandidateId,
}

impl CandidateRef {
    #[must_use]
    pub fn new(label: impl Into<String>, id: CandidateId) -> Self {
        Self {
            label: label.into(),
            id,
        }
    }
}

/// Classifier-specific detail attached to a scored candidate.
///
/// Atomic classifiers (reading a single text block) record the parsed value;
/// composite classifiers (assembling other candidates) record
/// [`CandidateRef`]s to their children so the solver can walk dependency edges
/// and the builder can resolve them after selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreDetails {
    ParsedText { raw_text: String },
    ParsedImage { image_id: String },
    /// Generic geometric/visual match score with no parsed payload — used by
    /// classifiers whose element carries no scalar value of its own
    /// (`Divider`, `Background`, `Shine`, `RotationSymbol`,
    /// `LoosePartSymbol`, `ProgressBarIndicator`, `Arrow`, `Diagram`).
    Geometric { note: String },
    Part {
        count: CandidateRef,
        image: CandidateRef,
        part_number: Option<CandidateRef>,
        piece_length: Option<CandidateRef>,
    },
    PartsList {
        parts: Vec<CandidateRef>,
    },
    Step {
        step_number: CandidateRef,
        parts_list: Option<CandidateRef>,
        diagram: Option<CandidateRef>,
        arrows: Vec<CandidateRef>,
        subassemblies: Vec<CandidateRef>,
        substeps: Vec<CandidateRef>,
    },
    SubStep {
        step_number: Option<CandidateRef>,
        parts_list: Option<CandidateRef>,
        diagram: Option<CandidateRef>,
    },
    SubAssembly {
        step_count: Option<u32>,
        sub_steps: Vec<CandidateRef>,
    },
    OpenBag {
        bag_number: Option<CandidateRef>,
        parts: Vec<CandidateRef>,
    },
    ProgressBar {
        indicators: Vec<CandidateRef>,
    },
    Page {
        page_number: Option<CandidateRef>,
        steps: Vec<CandidateRef>,
        background: Option<CandidateRef>,
        progress_bar: Option<CandidateRef>,
    },
}

/// A scored, typed candidate for some labeled element.
///
/// `T` is a zero-sized marker (see [`HasElementKind`]) that lets classifier
/// and solver code work with a strongly-typed handle; storage in
/// [`crate::result::ClassificationResult`] erases `T` to the runtime
/// [`ElementKind`] tag carried in `element_kind`, since the result holds
/// candidates of every element type in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<T> {
    pub id: CandidateId,
    pub label: String,
    pub element_kind: ElementKind,
    /// Confidence in `[0.0, 1.0]`.
    pub score: f64,
    /// `None` until the classifier has fully scored the candidate; a
    /// candidate with `score_details: None` is excluded from
    /// `get_scored_candidates` and can never be selected (see `spec.md` §4).
    pub score_details: Option<ScoreDetails>,
    /// Blocks this candidate consumes if selected. Empty for composite
    /// candidates, which consume only through their children.
    pub source_blocks: BTreeSet<BlockId>,
    #[serde(skip)]
    _marker: PhantomData<fn() -> T>,
}

impl<T: HasElementKind> Candidate<T> {
    /// An atomic candidate built directly from one extracted block.
    #[must_use]
    pub fn new_atomic(
        id: CandidateId,
        label: impl Into<String>,
        score: f64,
        score_details: ScoreDetails,
        source_block: BlockId,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            element_kind: T::KIND,
            score: score.clamp(0.0, 1.0),
            score_details: Some(score_details),
            source_blocks: BTreeSet::from([source_block]),
            _marker: PhantomData,
        }
    }

    /// A composite candidate assembled from other candidates. Its
    /// `source_blocks` is always empty: it consumes blocks only indirectly,
    /// through the children named in `score_details`.
    #[must_use]
    pub fn new_composite(
        id: CandidateId,
        label: impl Into<String>,
        score: f64,
        score_details: ScoreDetails,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            element_kind: T::KIND,
            score: score.clamp(0.0, 1.0),
            score_details: Some(score_details),
            source_blocks: BTreeSet::new(),
            _marker: PhantomData,
        }
    }

    /// An unscored placeholder, used while a classifier is still gathering
    /// candidates before it can rank them. Never selectable.
    #[must_use]
    pub fn unscored(id: CandidateId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            element_kind: T::KIND,
            score: 0.0,
            score_details: None,
            source_blocks: BTreeSet::new(),
            _marker: PhantomData,
        }
    }
}
