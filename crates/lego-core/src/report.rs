//! `ClassificationReport`: the auxiliary, serializable debug/golden-file output
//! alongside the built `Page` (see `spec.md` §6).

use crate::block::BlockId;
use crate::candidate::CandidateId;
use crate::element::ElementKind;
use crate::result::ClassificationResult;
use serde::{Deserialize, Serialize};

/// One candidate's final disposition, as recorded in a [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub label: String,
    pub element_kind: ElementKind,
    pub score: f64,
    pub selected: bool,
    pub rejection_reason: Option<String>,
}

/// The full record of one page's classification run: every candidate that was
/// scored, which ones were selected, which blocks ended up consumed or left
/// over, and every warning raised along the way.
///
/// Two runs over identical `(PageData, DocumentHints)` must produce identical
/// reports (candidate ids, selection set, and built tree) — this is the
/// determinism property the core guarantees (see `spec.md` §8 P1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub page_index: u32,
    pub candidates: Vec<CandidateRecord>,
    pub consumed_blocks: Vec<BlockId>,
    pub unprocessed_blocks: Vec<BlockId>,
    pub warnings: Vec<String>,
    pub rollback_log: Vec<String>,
}

impl ClassificationReport {
    /// Build a report from a finished [`ClassificationResult`] and the set of
    /// block ids that existed on the page (used to compute the complement:
    /// blocks the pipeline never touched).
    #[must_use]
    pub fn from_result(result: &ClassificationResult, all_block_ids: &[BlockId]) -> Self {
        let mut candidates: Vec<CandidateRecord> = result
            .all_candidates()
            .map(|c| CandidateRecord {
                id: c.id,
                label: c.label.clone(),
                element_kind: c.element_kind,
                score: c.score,
                selected: result.selected_candidate_ids().contains(&c.id),
                rejection_reason: result.rejection_reason(c.id).map(str::to_string),
            })
            .collect();
        candidates.sort_by_key(|c| c.id);

        let consumed_blocks: Vec<BlockId> = result.consumed_blocks().iter().copied().collect();
        let unprocessed_blocks: Vec<BlockId> = all_block_ids
            .iter()
            .copied()
            .filter(|id| !result.is_consumed(*id))
            .collect();

        Self {
            page_index: result.page_index(),
            candidates,
            consumed_blocks,
            unprocessed_blocks,
            warnings: result.warnings().to_vec(),
            rollback_log: result.rollback_log().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{Candidate, HasElementKind, ScoreDetails};

    struct PartCountMarker;
    impl HasElementKind for PartCountMarker {
        const KIND: ElementKind = ElementKind::PartCount;
    }

    #[test]
    fn unprocessed_blocks_is_the_complement_of_consumed() {
        let mut result = ClassificationResult::new(1);
        let id = result.next_candidate_id();
        let candidate = Candidate::<PartCountMarker>::new_atomic(
            id,
            "part_count",
            0.9,
            ScoreDetails::ParsedText {
                raw_text: "4x".to_string(),
            },
            5,
        );
        result.add(candidate);
        result.select(id);
        result.consume_blocks([5]);

        let report = ClassificationReport::from_result(&result, &[5, 6, 7]);
        assert_eq!(report.consumed_blocks, vec![5]);
        assert_eq!(report.unprocessed_blocks, vec![6, 7]);
        assert_eq!(report.candidates.len(), 1);
        assert!(report.candidates[0].selected);
    }

    #[test]
    fn round_trips_through_json() {
        let result = ClassificationResult::new(2);
        let report = ClassificationReport::from_result(&result, &[]);
        let json = serde_json::to_string(&report).expect("serialize");
        let back: ClassificationReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(report, back);
    }
}
