//! The shared constraint vocabulary `lego-classify`'s classifiers and
//! `lego-solver`'s constraint engine both speak.
//!
//! Structural constraints (child cardinality, parent-child coupling) are
//! auto-emitted by the schema constraint generator in `lego-solver` by
//! walking `ElementKind`; semantic constraints (uniqueness, orphan
//! prevention, variant exclusivity) are declared explicitly by individual
//! classifiers, since they depend on parsed values the generator has no way
//! to reflect on (see `spec.md` §4.1, `declare_constraints`).

use crate::candidate::CandidateId;

/// A semantic constraint a classifier declares over its own (and, for
/// orphan prevention, a related) label's candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticConstraint {
    /// At most one candidate may be selected within each group. Classifiers
    /// compute the groups themselves (e.g. `StepNumber` candidates grouped
    /// by parsed `value`).
    UniqueBy {
        label: String,
        groups: Vec<Vec<CandidateId>>,
    },
    /// If any candidate of `child_label` is selected, at least one candidate
    /// of `parent_label` must also be selected.
    NoOrphans {
        child_label: String,
        parent_label: String,
    },
    /// At most one of `ids` may be selected — used for variant candidates
    /// that are alternative interpretations of the same opportunity (e.g.
    /// `OpenBag`'s greedy vs. conservative part-set variants).
    MutuallyExclusive { ids: Vec<CandidateId> },
}
