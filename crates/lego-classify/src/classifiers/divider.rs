//! `Divider`: a thin horizontal or vertical rule separating two regions of
//! a page (`spec.md` §4.2).

use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::DividerElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "divider";
const MAX_THICKNESS: f64 = 3.0;
const MIN_LENGTH: f64 = 40.0;

struct DividerMarker;
impl HasElementKind for DividerMarker {
    const KIND: ElementKind = ElementKind::Divider;
}

pub struct DividerClassifier;

impl Classifier for DividerClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        for block in page.blocks() {
            if !block.is_drawing() {
                continue;
            }
            let bbox = block.bbox();
            let (short, long) = if bbox.width() >= bbox.height() {
                (bbox.height(), bbox.width())
            } else {
                (bbox.width(), bbox.height())
            };
            if short > MAX_THICKNESS || long < MIN_LENGTH {
                continue;
            }
            let thinness = (1.0 - short / MAX_THICKNESS).clamp(0.0, 1.0);
            let score = 0.4 + 0.5 * thinness;
            let id = result.next_candidate_id();
            result.add(Candidate::<DividerMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: "thin rule".to_string(),
                },
                block.id(),
            ));
        }
    }

    fn build(
        &self,
        candidate_id: CandidateId,
        page: &PageData,
        result: &mut ClassificationResult,
    ) -> Result<LegoPageElement> {
        let block_id = source_block(result, candidate_id, LABEL)?;
        let block = page
            .block(block_id)
            .ok_or_else(|| build_failed(candidate_id, LABEL, "source block no longer on page"))?;
        Ok(LegoPageElement::Divider(DividerElem {
            bbox: *block.bbox(),
        }))
    }
}
