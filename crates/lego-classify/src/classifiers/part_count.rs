//! `PartCount`: the "`Nx`" quantity text printed beside a part image
//! (`spec.md` §4.2).

use super::text_pattern::{combine_score, font_proximity_score};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::PartCountElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};
use once_cell::sync::Lazy;
use regex::Regex;

static COUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{1,3})\s*[x×]$").unwrap());

const LABEL: &str = "part_count";

struct PartCountMarker;
impl HasElementKind for PartCountMarker {
    const KIND: ElementKind = ElementKind::PartCount;
}

pub struct PartCountClassifier;

impl Classifier for PartCountClassifier {
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
            if !COUNT_PATTERN.is_match(trimmed) {
                continue;
            }
            let font_score = font_proximity_score(font_size, hints.part_count_size);
            let score = combine_score(0.65, font_score, 0.0);
            let id = result.next_candidate_id();
            result.add(Candidate::<PartCountMarker>::new_atomic(
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
        let digits = COUNT_PATTERN
            .captures(text.trim())
            .and_then(|c| c.get(1))
            .ok_or_else(|| build_failed(candidate_id, LABEL, format!("'{text}' has no count digits")))?;
        let value: u32 = digits
            .as_str()
            .parse()
            .map_err(|_| build_failed(candidate_id, LABEL, format!("'{text}' is not a valid count")))?;
        Ok(LegoPageElement::PartCount(PartCountElem {
            bbox: *block.bbox(),
            value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::{Block, BBox};

    fn page_with(text: &str) -> PageData {
        PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Text {
                id: 0,
                bbox: BBox::new(10.0, 10.0, 30.0, 25.0),
                text: text.to_string(),
                font_size: 8.0,
                font_name: "Helvetica".to_string(),
            }],
        )
    }

    #[test]
    fn matches_nx_pattern_case_insensitively() {
        let page = page_with("4X");
        let mut result = ClassificationResult::new(1);
        PartCountClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert_eq!(result.get_scored_candidates(LABEL).len(), 1);
    }

    #[test]
    fn build_extracts_count_value() {
        let page = page_with("4x");
        let mut result = ClassificationResult::new(1);
        PartCountClassifier.score(&page, &DocumentHints::default(), &mut result);
        let id = result.get_scored_candidates(LABEL)[0].id;
        let LegoPageElement::PartCount(elem) =
            PartCountClassifier.build(id, &page, &mut result).unwrap()
        else {
            panic!("expected PartCount");
        };
        assert_eq!(elem.value, 4);
    }

    #[test]
    fn rejects_plain_integer() {
        let page = page_with("4");
        let mut result = ClassificationResult::new(1);
        PartCountClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert!(result.get_scored_candidates(LABEL).is_empty());
    }
}
