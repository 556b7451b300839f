//! `Background`: the full-page (or near full-page) filled rectangle behind
//! a step's content (`spec.md` §4.2).

use super::geometry_shape::proximity;
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::BackgroundElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "background";
const MIN_AREA_FRACTION: f64 = 0.6;

struct BackgroundMarker;
impl HasElementKind for BackgroundMarker {
    const KIND: ElementKind = ElementKind::Background;
}

pub struct BackgroundClassifier;

impl Classifier for BackgroundClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let page_area = page.page_width() * page.page_height();
        if page_area <= 0.0 {
            return;
        }
        for block in page.blocks() {
            if !block.is_drawing() {
                continue;
            }
            let bbox = block.effective_bbox();
            let area_fraction = bbox.area() / page_area;
            if area_fraction < MIN_AREA_FRACTION {
                continue;
            }
            let score = proximity(area_fraction, 1.0, 0.4).max(0.5);
            let id = result.next_candidate_id();
            result.add(Candidate::<BackgroundMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: format!("covers {:.0}% of the page", area_fraction * 100.0),
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
        Ok(LegoPageElement::Background(BackgroundElem {
            bbox: *block.bbox(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::{Block, BBox};

    #[test]
    fn scores_full_page_drawing_highly() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Drawing {
                id: 0,
                bbox: BBox::new(0.0, 0.0, 600.0, 840.0),
                original_bbox: None,
                paths: None,
                fill_color: Some((245, 245, 245)),
                stroke_color: None,
                thickness: None,
            }],
        );
        let mut result = ClassificationResult::new(1);
        BackgroundClassifier.score(&page, &DocumentHints::default(), &mut result);
        let candidates = result.get_scored_candidates(LABEL);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].score > 0.5);
    }

    #[test]
    fn ignores_small_drawing() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Drawing {
                id: 0,
                bbox: BBox::new(10.0, 10.0, 30.0, 30.0),
                original_bbox: None,
                paths: None,
                fill_color: None,
                stroke_color: None,
                thickness: None,
            }],
        );
        let mut result = ClassificationResult::new(1);
        BackgroundClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert!(result.get_scored_candidates(LABEL).is_empty());
    }
}
