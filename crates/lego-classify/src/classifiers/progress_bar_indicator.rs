//! `ProgressBarIndicator`: one filled-or-empty segment of the page's
//! progress bar (`spec.md` §4.2). `ProgressBar` groups these into a row.

use super::geometry_shape::{aspect_ratio, darkness, proximity};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::ProgressBarIndicatorElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "progress_bar_indicator";
const MAX_DIMENSION: f64 = 12.0;
const FILLED_THRESHOLD: f64 = 0.5;

struct ProgressBarIndicatorMarker;
impl HasElementKind for ProgressBarIndicatorMarker {
    const KIND: ElementKind = ElementKind::ProgressBarIndicator;
}

pub struct ProgressBarIndicatorClassifier;

impl Classifier for ProgressBarIndicatorClassifier {
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
            if bbox.width() > MAX_DIMENSION || bbox.height() > MAX_DIMENSION {
                continue;
            }
            let squareness = proximity(aspect_ratio(bbox), 1.0, 0.5);
            if squareness <= 0.0 {
                continue;
            }
            let score = 0.3 + 0.4 * squareness;
            let id = result.next_candidate_id();
            result.add(Candidate::<ProgressBarIndicatorMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: "progress bar segment".to_string(),
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
        let filled = match block {
            lego_core::Block::Drawing {
                fill_color: Some(color),
                ..
            } => darkness(*color) >= FILLED_THRESHOLD,
            _ => false,
        };
        Ok(LegoPageElement::ProgressBarIndicator(
            ProgressBarIndicatorElem {
                bbox: *block.bbox(),
                filled,
            },
        ))
    }
}
