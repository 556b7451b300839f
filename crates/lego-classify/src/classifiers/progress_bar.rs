//! `ProgressBar`: the row of step-progress segments printed in a page's
//! margin, grouping `ProgressBarIndicator` candidates by shared vertical
//! alignment (`spec.md` §4.2).

use super::util::{build_failed, candidate_bbox, scored_with_bbox};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::element::ProgressBarElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "progress_bar";
const ROW_TOLERANCE: f64 = 4.0;
const MIN_ROW_SIZE: usize = 2;

struct ProgressBarMarker;
impl HasElementKind for ProgressBarMarker {
    const KIND: ElementKind = ElementKind::ProgressBar;
}

pub struct ProgressBarClassifier;

impl Classifier for ProgressBarClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &["progress_bar_indicator"]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let mut indicators = scored_with_bbox(page, result, "progress_bar_indicator");
        indicators.sort_by(|(_, a), (_, b)| a.y0.partial_cmp(&b.y0).unwrap_or(std::cmp::Ordering::Equal));

        let mut rows: Vec<Vec<(CandidateId, lego_core::BBox)>> = Vec::new();
        for entry in indicators {
            match rows.iter_mut().find(|row| {
                let (_, anchor) = row[0];
                (anchor.y0 - entry.1.y0).abs() <= ROW_TOLERANCE
            }) {
                Some(row) => row.push(entry),
                None => rows.push(vec![entry]),
            }
        }

        for row in rows {
            if row.len() < MIN_ROW_SIZE {
                continue;
            }
            let count_score = (row.len() as f64 / 6.0).clamp(0.0, 1.0);
            let score = (0.5 + 0.4 * count_score).clamp(0.0, 1.0);
            let mut indicator_refs: Vec<CandidateRef> = row
                .iter()
                .map(|(id, _)| CandidateRef::new("progress_bar_indicator", *id))
                .collect();
            indicator_refs.sort_by_key(|r| r.id);

            let id = result.next_candidate_id();
            result.add(Candidate::<ProgressBarMarker>::new_composite(
                id,
                LABEL,
                score,
                ScoreDetails::ProgressBar {
                    indicators: indicator_refs,
                },
            ));
        }
    }

    fn build(
        &self,
        candidate_id: CandidateId,
        page: &PageData,
        result: &mut ClassificationResult,
    ) -> Result<LegoPageElement> {
        let Some(candidate) = result.candidate(candidate_id).cloned() else {
            return Err(build_failed(candidate_id, LABEL, "candidate missing"));
        };
        let Some(ScoreDetails::ProgressBar { indicators }) = candidate.score_details else {
            return Err(build_failed(candidate_id, LABEL, "missing score details"));
        };
        if indicators.len() < MIN_ROW_SIZE {
            return Err(build_failed(candidate_id, LABEL, "a progress bar needs at least two indicators"));
        }

        let mut built = Vec::with_capacity(indicators.len());
        for r in &indicators {
            let elem = result
                .built_element(r.id)
                .cloned()
                .ok_or_else(|| build_failed(candidate_id, LABEL, "a referenced indicator was not selected/built"))?;
            built.push(elem);
        }

        let bbox = candidate_bbox(page, result, candidate_id)
            .ok_or_else(|| build_failed(candidate_id, LABEL, "a progress bar needs a resolvable bbox"))?;
        Ok(LegoPageElement::ProgressBar(ProgressBarElem {
            bbox,
            indicators: built,
        }))
    }
}
