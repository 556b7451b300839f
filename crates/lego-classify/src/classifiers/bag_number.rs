//! `BagNumber`: the integer printed beside an open-bag glyph identifying
//! which numbered bag to open next (`spec.md` §4.2).

use super::text_pattern::{combine_score, near_top_left};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::BagNumberElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};
use once_cell::sync::Lazy;
use regex::Regex;

static SMALL_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}$").unwrap());

const LABEL: &str = "bag_number";

struct BagNumberMarker;
impl HasElementKind for BagNumberMarker {
    const KIND: ElementKind = ElementKind::BagNumber;
}

pub struct BagNumberClassifier;

impl Classifier for BagNumberClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        for block in page.blocks() {
            let Some((text, _, _)) = block.as_text() else {
                continue;
            };
            let trimmed = text.trim();
            if !SMALL_INTEGER.is_match(trimmed) {
                continue;
            }
            let position_boost = near_top_left(block.bbox(), page.page_width(), page.page_height());
            let score = combine_score(0.45, 0.5, position_boost);
            let id = result.next_candidate_id();
            result.add(Candidate::<BagNumberMarker>::new_atomic(
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
        let value: u32 = text
            .trim()
            .parse()
            .map_err(|_| build_failed(candidate_id, LABEL, format!("'{text}' is not an integer")))?;
        Ok(LegoPageElement::BagNumber(BagNumberElem {
            bbox: *block.bbox(),
            value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::{Block, BBox};

    #[test]
    fn top_left_integer_scores_above_neutral() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Text {
                id: 0,
                bbox: BBox::new(20.0, 20.0, 40.0, 40.0),
                text: "3".to_string(),
                font_size: 14.0,
                font_name: "Helvetica".to_string(),
            }],
        );
        let mut result = ClassificationResult::new(1);
        BagNumberClassifier.score(&page, &DocumentHints::default(), &mut result);
        let candidates = result.get_scored_candidates(LABEL);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].score > 0.5);
    }
}
