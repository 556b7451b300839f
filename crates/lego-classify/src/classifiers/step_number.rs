//! `StepNumber`: the bold integer labeling a build step (`spec.md` §4.2,
//! scenario S2 — uniqueness across candidates sharing the same value).

use super::text_pattern::{combine_score, font_proximity_score, not_bottom_band};
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::StepNumberElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails, SemanticConstraint,
};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

static SMALL_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}$").unwrap());

const LABEL: &str = "step_number";

struct StepNumberMarker;
impl HasElementKind for StepNumberMarker {
    const KIND: ElementKind = ElementKind::StepNumber;
}

pub struct StepNumberClassifier;

impl Classifier for StepNumberClassifier {
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
            let score = combine_score(0.55, font_score, position_boost);
            let id = result.next_candidate_id();
            result.add(Candidate::<StepNumberMarker>::new_atomic(
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
        Ok(LegoPageElement::StepNumber(StepNumberElem {
            bbox: *block.bbox(),
            value,
        }))
    }

    /// At most one `StepNumber` candidate may be selected per distinct
    /// parsed value (`spec.md` §3 invariant 4, §8 invariant 4).
    fn declare_constraints(&self, result: &ClassificationResult) -> Vec<SemanticConstraint> {
        let mut by_value: FxHashMap<u32, Vec<CandidateId>> = FxHashMap::default();
        for candidate in result.get_scored_candidates(LABEL) {
            let Some(ScoreDetails::ParsedText { raw_text }) = &candidate.score_details else {
                continue;
            };
            if let Ok(value) = raw_text.trim().parse::<u32>() {
                by_value.entry(value).or_default().push(candidate.id);
            }
        }
        vec![SemanticConstraint::UniqueBy {
            label: LABEL.to_string(),
            groups: by_value.into_values().collect(),
        }]
    }
}
