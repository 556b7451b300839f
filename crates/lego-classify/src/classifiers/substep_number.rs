//! `SubstepNumber`: the integer labeling a step nested inside a
//! sub-assembly (`spec.md` §4.2). Shares `StepNumber`'s text pattern but
//! scores with a lower base confidence since, read in isolation, a small
//! integer cannot tell a substep number from a step number — the pipeline
//! relies on the solver and `SubStep`'s containment test to disambiguate.

use super::text_pattern::{combine_score, font_proximity_score, not_bottom_band};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::SubstepNumberElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};
use once_cell::sync::Lazy;
use regex::Regex;

static SMALL_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}$").unwrap());

const LABEL: &str = "substep_number";

struct SubstepNumberMarker;
impl HasElementKind for SubstepNumberMarker {
    const KIND: ElementKind = ElementKind::SubstepNumber;
}

pub struct SubstepNumberClassifier;

impl Classifier for SubstepNumberClassifier {
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
            let position_boost = not_bottom_band(block.bbox(), page.page_height(), 0.08);
            let font_score = font_proximity_score(font_size, hints.step_number_size);
            let score = combine_score(0.4, font_score, position_boost);
            let id = result.next_candidate_id();
            result.add(Candidate::<SubstepNumberMarker>::new_atomic(
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
        Ok(LegoPageElement::SubstepNumber(SubstepNumberElem {
            bbox: *block.bbox(),
            value,
        }))
    }
}
