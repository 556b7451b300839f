//! `ClassificationResult`: the per-page scratchpad that accumulates candidates,
//! records the solver's selection, and holds the built element tree.
//!
//! One `ClassificationResult` exists per page for the lifetime of that page's
//! classification run. It is the single place solver and builder code resolve
//! `CandidateRef`s against, which is why `Candidate` never stores a pointer to
//! another candidate (see `crate::candidate`).

use crate::block::BlockId;
use crate::candidate::{Candidate, CandidateId, CandidateRef, HasElementKind, ScoreDetails};
use crate::element::{ElementKind, LegoPageElement};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// A candidate with its generic marker erased to the runtime [`ElementKind`]
/// tag, as stored in [`ClassificationResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCandidate {
    pub id: CandidateId,
    pub label: String,
    pub element_kind: ElementKind,
    pub score: f64,
    pub score_details: Option<ScoreDetails>,
    pub source_blocks: BTreeSet<BlockId>,
}

impl<T: HasElementKind> From<Candidate<T>> for StoredCandidate {
    fn from(c: Candidate<T>) -> Self {
        Self {
            id: c.id,
            label: c.label,
            element_kind: c.element_kind,
            score: c.score,
            score_details: c.score_details,
            source_blocks: c.source_blocks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    /// Scored and eligible for selection.
    Scored,
    /// Chosen by the solver; not yet built into an element.
    Selected,
    /// Built into an element and attached to the tree.
    Built,
    /// Selected but the builder could not assemble it (a dependency was
    /// itself rejected or failed); the solver re-runs without it.
    Failed,
}

/// A snapshot of selection/consumption state, pushed before a speculative
/// solve and restored if the builder rejects the selection (see `spec.md` §9
/// on build-failure rollback).
#[derive(Debug, Clone)]
struct Checkpoint {
    selected_candidate_ids: BTreeSet<CandidateId>,
    consumed_blocks: BTreeSet<BlockId>,
    built_ids: BTreeSet<CandidateId>,
}

/// Per-page classification scratchpad: every candidate ever scored, the
/// solver's selection, the built elements, and diagnostics.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    page_index: u32,
    next_id: CandidateId,
    candidates: FxHashMap<CandidateId, StoredCandidate>,
    by_label: FxHashMap<String, Vec<CandidateId>>,
    states: FxHashMap<CandidateId, CandidateState>,
    built_elements: FxHashMap<CandidateId, LegoPageElement>,
    consumed_blocks: BTreeSet<BlockId>,
    selected_candidate_ids: BTreeSet<CandidateId>,
    rejection_reasons: FxHashMap<CandidateId, String>,
    warnings: Vec<String>,
    rollback_log: Vec<String>,
    checkpoints: Vec<Checkpoint>,
}

impl ClassificationResult {
    #[must_use]
    pub fn new(page_index: u32) -> Self {
        Self {
            page_index,
            next_id: 0,
            candidates: FxHashMap::default(),
            by_label: FxHashMap::default(),
            states: FxHashMap::default(),
            built_elements: FxHashMap::default(),
            consumed_blocks: BTreeSet::new(),
            selected_candidate_ids: BTreeSet::new(),
            rejection_reasons: FxHashMap::default(),
            warnings: Vec::new(),
            rollback_log: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    #[must_use]
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Allocate a fresh id, unique within this page's run.
    pub fn next_candidate_id(&mut self) -> CandidateId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record a candidate a classifier has finished scoring.
    pub fn add<T: HasElementKind>(&mut self, candidate: Candidate<T>) -> CandidateId {
        let id = candidate.id;
        let label = candidate.label.clone();
        let is_scored = candidate.score_details.is_some();
        self.candidates.insert(id, candidate.into());
        self.by_label.entry(label).or_default().push(id);
        if is_scored {
            self.states.insert(id, CandidateState::Scored);
        }
        id
    }

    #[must_use]
    pub fn candidate(&self, id: CandidateId) -> Option<&StoredCandidate> {
        self.candidates.get(&id)
    }

    /// Every candidate ever added, scored or not, in no particular order.
    pub fn all_candidates(&self) -> impl Iterator<Item = &StoredCandidate> {
        self.candidates.values()
    }

    /// Resolve a `(label, id)` reference recorded in another candidate's
    /// `score_details`. Debug-asserts the label matches, since a mismatch
    /// means a classifier built a stale or wrong reference.
    #[must_use]
    pub fn resolve(&self, candidate_ref: &CandidateRef) -> Option<&StoredCandidate> {
        let found = self.candidates.get(&candidate_ref.id)?;
        debug_assert_eq!(
            found.label, candidate_ref.label,
            "CandidateRef label does not match the candidate it points to"
        );
        Some(found)
    }

    /// All fully-scored candidates for `label`, in the order they were added.
    /// Candidates still missing `score_details` (never fully scored) are
    /// excluded: they can never be selected.
    #[must_use]
    pub fn get_scored_candidates(&self, label: &str) -> Vec<&StoredCandidate> {
        self.by_label
            .get(label)
            .into_iter()
            .flatten()
            .filter_map(|id| self.candidates.get(id))
            .filter(|c| c.score_details.is_some())
            .collect()
    }

    #[must_use]
    pub fn state(&self, id: CandidateId) -> Option<CandidateState> {
        self.states.get(&id).copied()
    }

    pub fn select(&mut self, id: CandidateId) {
        self.selected_candidate_ids.insert(id);
        self.states.insert(id, CandidateState::Selected);
    }

    #[must_use]
    pub fn selected_candidate_ids(&self) -> &BTreeSet<CandidateId> {
        &self.selected_candidate_ids
    }

    pub fn mark_built(&mut self, id: CandidateId, element: LegoPageElement) {
        self.built_elements.insert(id, element);
        self.states.insert(id, CandidateState::Built);
    }

    #[must_use]
    pub fn built_element(&self, id: CandidateId) -> Option<&LegoPageElement> {
        self.built_elements.get(&id)
    }

    pub fn mark_failed(&mut self, id: CandidateId, reason: impl Into<String>) {
        self.states.insert(id, CandidateState::Failed);
        self.rejection_reasons.insert(id, reason.into());
    }

    pub fn reject(&mut self, id: CandidateId, reason: impl Into<String>) {
        self.rejection_reasons.insert(id, reason.into());
    }

    #[must_use]
    pub fn rejection_reason(&self, id: CandidateId) -> Option<&str> {
        self.rejection_reasons.get(&id).map(String::as_str)
    }

    pub fn consume_blocks(&mut self, blocks: impl IntoIterator<Item = BlockId>) {
        self.consumed_blocks.extend(blocks);
    }

    #[must_use]
    pub fn consumed_blocks(&self) -> &BTreeSet<BlockId> {
        &self.consumed_blocks
    }

    #[must_use]
    pub fn is_consumed(&self, block_id: BlockId) -> bool {
        self.consumed_blocks.contains(&block_id)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Snapshot current selection/consumption/build state before a
    /// speculative solve-and-build pass.
    pub fn checkpoint(&mut self) {
        self.checkpoints.push(Checkpoint {
            selected_candidate_ids: self.selected_candidate_ids.clone(),
            consumed_blocks: self.consumed_blocks.clone(),
            built_ids: self.built_elements.keys().copied().collect(),
        });
    }

    /// Undo everything done since the last [`ClassificationResult::checkpoint`],
    /// logging why. Used when the builder rejects a selection and the solver
    /// must be re-invoked with the offending candidate excluded.
    pub fn rollback(&mut self, reason: impl Into<String>) {
        let Some(checkpoint) = self.checkpoints.pop() else {
            return;
        };
        let reverted_selections: Vec<CandidateId> = self
            .selected_candidate_ids
            .difference(&checkpoint.selected_candidate_ids)
            .copied()
            .collect();
        for id in &reverted_selections {
            self.states.remove(id);
        }
        let reverted_builds: Vec<CandidateId> = self
            .built_elements
            .keys()
            .filter(|id| !checkpoint.built_ids.contains(id))
            .copied()
            .collect();
        for id in &reverted_builds {
            self.built_elements.remove(id);
        }
        self.selected_candidate_ids = checkpoint.selected_candidate_ids;
        self.consumed_blocks = checkpoint.consumed_blocks;
        self.rollback_log.push(reason.into());
    }

    #[must_use]
    pub fn rollback_log(&self) -> &[String] {
        &self.rollback_log
    }
}
