//! `Shine`: the small light highlight mark drawn on a part image to
//! indicate it is new in this step (`spec.md` §4.2).

use super::geometry_shape::darkness;
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::ShineElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "shine";
const MAX_DIMENSION: f64 = 16.0;

struct ShineMarker;
impl HasElementKind for ShineMarker {
    const KIND: ElementKind = ElementKind::Shine;
}

pub struct ShineClassifier;

impl Classifier for ShineClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        for block in page.blocks() {
            let lego_core::Block::Drawing {
                fill_color, bbox, ..
            } = block
            else {
                continue;
            };
            if bbox.width() > MAX_DIMENSION || bbox.height() > MAX_DIMENSION {
                continue;
            }
            let Some(color) = fill_color else {
                continue;
            };
            let lightness = 1.0 - darkness(*color);
            if lightness < 0.6 {
                continue;
            }
            let score = 0.3 + 0.5 * lightness;
            let id = result.next_candidate_id();
            result.add(Candidate::<ShineMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: "small bright highlight".to_string(),
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
        Ok(LegoPageElement::Shine(ShineElem {
            bbox: *block.bbox(),
        }))
    }
}
