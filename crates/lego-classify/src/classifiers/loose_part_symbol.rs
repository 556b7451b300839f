//! `LoosePartSymbol`: the small filled glyph marking a single part placed
//! directly onto the model without its own count/image pairing
//! (`spec.md` §4.2).

use super::geometry_shape::{aspect_ratio, darkness, proximity};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::LoosePartSymbolElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "loose_part_symbol";
const MAX_DIMENSION: f64 = 20.0;

struct LoosePartSymbolMarker;
impl HasElementKind for LoosePartSymbolMarker {
    const KIND: ElementKind = ElementKind::LoosePartSymbol;
}

pub struct LoosePartSymbolClassifier;

impl Classifier for LoosePartSymbolClassifier {
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
            let squareness = proximity(aspect_ratio(bbox), 1.0, 0.35);
            if squareness <= 0.0 {
                continue;
            }
            let fill_score = fill_color.map_or(0.3, darkness);
            let score = 0.3 + 0.3 * squareness + 0.3 * fill_score;
            let id = result.next_candidate_id();
            result.add(Candidate::<LoosePartSymbolMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: "small filled glyph".to_string(),
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
        Ok(LegoPageElement::LoosePartSymbol(LoosePartSymbolElem {
            bbox: *block.bbox(),
        }))
    }
}
