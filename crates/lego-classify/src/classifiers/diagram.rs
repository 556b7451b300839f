//! `Diagram`: the rendered view of the model after placing a step's parts
//! (`spec.md` §4.2, §4.5 — `Step.diagram` is bound post-solve by spatial
//! assignment, not here).

use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::DiagramElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "diagram";
const MIN_AREA: f64 = 2_500.0;
const MAX_PAGE_FRACTION: f64 = 0.6;

struct DiagramMarker;
impl HasElementKind for DiagramMarker {
    const KIND: ElementKind = ElementKind::Diagram;
}

pub struct DiagramClassifier;

impl Classifier for DiagramClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let page_area = page.page_width() * page.page_height();
        for block in page.blocks() {
            if !(block.is_image() || block.is_drawing()) {
                continue;
            }
            let bbox = block.effective_bbox();
            if bbox.area() < MIN_AREA {
                continue;
            }
            if page_area > 0.0 && bbox.area() / page_area > MAX_PAGE_FRACTION {
                continue;
            }
            let score = 0.55;
            let id = result.next_candidate_id();
            let note = if block.is_image() {
                "rendered image block"
            } else {
                "large vector drawing"
            };
            result.add(Candidate::<DiagramMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: note.to_string(),
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
        let image_id = match block {
            lego_core::Block::Image { image_id, .. } => Some(image_id.clone()),
            _ => None,
        };
        Ok(LegoPageElement::Diagram(DiagramElem {
            bbox: *block.bbox(),
            image_id,
        }))
    }
}
