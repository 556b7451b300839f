//! The classifier contract (`spec.md` §4.1).
//!
//! Every classifier is a small, stateless rule: it reads blocks and hints and
//! proposes scored candidates (`score`), turns a *selected* candidate into a
//! typed element (`build`), and optionally declares semantic constraints the
//! schema generator can't infer structurally (`declare_constraints`). The
//! pipeline driver owns dependency ordering, solving, and assembly — a
//! classifier never calls another classifier directly.

use lego_core::{CandidateId, ClassificationResult, DocumentHints, LegoPageElement, PageData, Result, SemanticConstraint};

pub trait Classifier {
    /// The label this classifier produces. Must be unique across the
    /// pipeline's registered classifier set.
    fn output(&self) -> &'static str;

    /// Labels this classifier reads candidates of via
    /// `result.get_scored_candidates`. Determines topological order.
    fn requires(&self) -> &'static [&'static str];

    /// Evaluate intrinsic properties of blocks (and, for composites,
    /// structural opportunities among already-scored candidates of
    /// `requires` labels) and emit zero or more candidates into `result`.
    /// Never pre-assigns a specific child — that's the solver's job.
    fn score(&self, page: &PageData, hints: &DocumentHints, result: &mut ClassificationResult);

    /// Materialize the `LegoPageElement` for a selected candidate. Atomic
    /// classifiers read their source block's geometry from `page`; composite
    /// classifiers look up their already-built children via
    /// `result.built_element`, which is guaranteed populated because the
    /// pipeline builds in topological order.
    fn build(
        &self,
        candidate_id: CandidateId,
        page: &PageData,
        result: &mut ClassificationResult,
    ) -> Result<LegoPageElement>;

    /// Semantic constraints this classifier's own label needs beyond the
    /// schema generator's structural implications (uniqueness, orphan
    /// prevention, variant exclusivity). Most classifiers need none.
    fn declare_constraints(&self, _result: &ClassificationResult) -> Vec<SemanticConstraint> {
        Vec::new()
    }
}
