//! `PageNumber`: the printed page index, a small integer in a page's
//! bottom/side margin (`spec.md` §4.2, scenario S1).

use super::text_pattern::{combine_score, font_proximity_score, near_page_margin};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::PageNumberElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};
use once_cell::sync::Lazy;
use regex::Regex;

static SMALL_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}$").unwrap());

const LABEL: &str = "page_number";

struct PageNumberMarker;
impl HasElementKind for PageNumberMarker {
    const KIND: ElementKind = ElementKind::PageNumber;
}

/// Scores small integers sitting in a page's margin as page-number
/// candidates.
pub struct PageNumberClassifier;

impl Classifier for PageNumberClassifier {
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
            if !SMALL_INTEGER.is_match(trimmed) {
                continue;
            }
            let position_boost =
                near_page_margin(block.bbox(), page.page_width(), page.page_height(), 0.12);
            let font_score = font_proximity_score(font_size, hints.page_number_size);
            let score = combine_score(0.6, font_score, position_boost);
            let id = result.next_candidate_id();
            result.add(Candidate::<PageNumberMarker>::new_atomic(
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
        Ok(LegoPageElement::PageNumber(PageNumberElem {
            bbox: *block.bbox(),
            value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::{Block, BBox};

    fn page_with(text: &str, bbox: BBox, font_size: f64) -> PageData {
        PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Text {
                id: 0,
                bbox,
                text: text.to_string(),
                font_size,
                font_name: "Helvetica".to_string(),
            }],
        )
    }

    #[test]
    fn scores_bottom_margin_integer_highly() {
        let page = page_with("5", BBox::new(560.0, 810.0, 580.0, 825.0), 9.0);
        let hints = DocumentHints {
            page_number_size: Some(9.0),
            ..DocumentHints::default()
        };
        let mut result = ClassificationResult::new(1);
        PageNumberClassifier.score(&page, &hints, &mut result);
        let candidates = result.get_scored_candidates(LABEL);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].score > 0.8);
    }

    #[test]
    fn build_parses_integer_value() {
        let page = page_with("5", BBox::new(560.0, 810.0, 580.0, 825.0), 9.0);
        let mut result = ClassificationResult::new(1);
        PageNumberClassifier.score(&page, &DocumentHints::default(), &mut result);
        let id = result.get_scored_candidates(LABEL)[0].id;
        let element = PageNumberClassifier.build(id, &page, &mut result).unwrap();
        let LegoPageElement::PageNumber(elem) = element else {
            panic!("expected PageNumber");
        };
        assert_eq!(elem.value, 5);
    }

    #[test]
    fn ignores_non_integer_text() {
        let page = page_with("Step", BBox::new(560.0, 810.0, 580.0, 825.0), 9.0);
        let mut result = ClassificationResult::new(1);
        PageNumberClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert!(result.get_scored_candidates(LABEL).is_empty());
    }
}
