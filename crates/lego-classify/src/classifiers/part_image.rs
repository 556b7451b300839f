//! `PartImage`: wraps every `Image` block as a candidate with a flat
//! positive score; pairing with a `PartCount` is `Part`'s job, not this
//! classifier's (`spec.md` §4.2).

use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::PartImageElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "part_image";
const FLAT_SCORE: f64 = 0.7;

struct PartImageMarker;
impl HasElementKind for PartImageMarker {
    const KIND: ElementKind = ElementKind::PartImage;
}

pub struct PartImageClassifier;

impl Classifier for PartImageClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        for block in page.blocks() {
            if !block.is_image() {
                continue;
            }
            let id = result.next_candidate_id();
            let image_id = match block {
                lego_core::Block::Image { image_id, .. } => image_id.clone(),
                _ => unreachable!(),
            };
            result.add(Candidate::<PartImageMarker>::new_atomic(
                id,
                LABEL,
                FLAT_SCORE,
                ScoreDetails::ParsedImage { image_id },
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
        let lego_core::Block::Image { image_id, .. } = block else {
            return Err(build_failed(candidate_id, LABEL, "source block is not an image"));
        };
        Ok(LegoPageElement::PartImage(PartImageElem {
            bbox: *block.bbox(),
            image_id: image_id.clone(),
        }))
    }
}
