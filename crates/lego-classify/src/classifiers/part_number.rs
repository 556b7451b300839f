//! `PartNumber`: the catalogue/mold number printed near a part, a bare
//! 4-8 digit string (`spec.md` §4.2).

use super::text_pattern::{combine_score, font_proximity_score};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::PartNumberElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};
use once_cell::sync::Lazy;
use regex::Regex;

static PART_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,8}$").unwrap());

const LABEL: &str = "part_number";

struct PartNumberMarker;
impl HasElementKind for PartNumberMarker {
    const KIND: ElementKind = ElementKind::PartNumber;
}

pub struct PartNumberClassifier;

impl Classifier for PartNumberClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, hints: &DocumentHints, result: &mut ClassificationResult) {
        for block in page.blocks() {
            let Some((text, font_size, _)) = block.as_text() else {
                continue;
            };
            let trimmed = text.trim();
            if !PART_NUMBER.is_match(trimmed) {
                continue;
            }
            let font_score = font_proximity_score(font_size, hints.part_number_size);
            let score = combine_score(0.5, font_score, 0.0);
            let id = result.next_candidate_id();
            result.add(Candidate::<PartNumberMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::ParsedText {
                    raw_text: trimmed.to_string(),
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
        let (text, ..) = block
            .as_text()
            .ok_or_else(|| build_failed(candidate_id, LABEL, "source block is not text"))?;
        Ok(LegoPageElement::PartNumber(PartNumberElem {
            bbox: *block.bbox(),
            value: text.trim().to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::{Block, BBox};

    #[test]
    fn matches_six_digit_numbers() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Text {
                id: 0,
                bbox: BBox::new(10.0, 10.0, 30.0, 25.0),
                text: "303226".to_string(),
                font_size: 6.0,
                font_name: "Helvetica".to_string(),
            }],
        );
        let mut result = ClassificationResult::new(1);
        PartNumberClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert_eq!(result.get_scored_candidates(LABEL).len(), 1);
    }

    #[test]
    fn rejects_short_integers() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Text {
                id: 0,
                bbox: BBox::new(10.0, 10.0, 30.0, 25.0),
                text: "42".to_string(),
                font_size: 6.0,
                font_name: "Helvetica".to_string(),
            }],
        );
        let mut result = ClassificationResult::new(1);
        PartNumberClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert!(result.get_scored_candidates(LABEL).is_empty());
    }
}
