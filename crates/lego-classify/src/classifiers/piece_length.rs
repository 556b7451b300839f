//! `PieceLength`: the "`NL`" stud-length marking printed beside long
//! Technic-style pieces (`spec.md` §4.2).

use super::text_pattern::combine_score;
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::PieceLengthElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};
use once_cell::sync::Lazy;
use regex::Regex;

static LENGTH_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{1,3})\s*l$").unwrap());

const LABEL: &str = "piece_length";

struct PieceLengthMarker;
impl HasElementKind for PieceLengthMarker {
    const KIND: ElementKind = ElementKind::PieceLength;
}

pub struct PieceLengthClassifier;

impl Classifier for PieceLengthClassifier {
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
            if !LENGTH_PATTERN.is_match(trimmed) {
                continue;
            }
            let score = combine_score(0.6, 0.5, 0.0);
            let id = result.next_candidate_id();
            result.add(Candidate::<PieceLengthMarker>::new_atomic(
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
        Ok(LegoPageElement::PieceLength(PieceLengthElem {
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
    fn matches_length_marking() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Text {
                id: 0,
                bbox: BBox::new(10.0, 10.0, 30.0, 25.0),
                text: "8L".to_string(),
                font_size: 7.0,
                font_name: "Helvetica".to_string(),
            }],
        );
        let mut result = ClassificationResult::new(1);
        PieceLengthClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert_eq!(result.get_scored_candidates(LABEL).len(), 1);
    }
}
