//! `RotationSymbol`: the small circular-arrow icon indicating a
//! sub-assembly should be rotated before the next step (`spec.md` §4.2).

use super::geometry_shape::{aspect_ratio, proximity};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::RotationSymbolElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "rotation_symbol";
const MAX_DIMENSION: f64 = 40.0;

struct RotationSymbolMarker;
impl HasElementKind for RotationSymbolMarker {
    const KIND: ElementKind = ElementKind::RotationSymbol;
}

pub struct RotationSymbolClassifier;

impl Classifier for RotationSymbolClassifier {
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
            let squareness = proximity(aspect_ratio(bbox), 1.0, 0.3);
            if squareness <= 0.0 {
                continue;
            }
            let score = 0.3 + 0.4 * squareness;
            let id = result.next_candidate_id();
            result.add(Candidate::<RotationSymbolMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: "small roughly-square glyph".to_string(),
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
        Ok(LegoPageElement::RotationSymbol(RotationSymbolElem {
            bbox: *block.bbox(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::{Block, BBox};

    #[test]
    fn scores_small_square_glyph() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Drawing {
                id: 0,
                bbox: BBox::new(100.0, 100.0, 125.0, 125.0),
                original_bbox: None,
                paths: None,
                fill_color: None,
                stroke_color: Some((0, 0, 0)),
                thickness: Some(1.5),
            }],
        );
        let mut result = ClassificationResult::new(1);
        RotationSymbolClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert_eq!(result.get_scored_candidates(LABEL).len(), 1);
    }

    #[test]
    fn ignores_large_drawing() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Drawing {
                id: 0,
                bbox: BBox::new(100.0, 100.0, 300.0, 300.0),
                original_bbox: None,
                paths: None,
                fill_color: None,
                stroke_color: None,
                thickness: None,
            }],
        );
        let mut result = ClassificationResult::new(1);
        RotationSymbolClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert!(result.get_scored_candidates(LABEL).is_empty());
    }
}
