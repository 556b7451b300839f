//! `Step`: pairs a `StepNumber` with a compatible `PartsList`
//! (`spec.md` §4.2). `diagram`, `arrows`, `subassemblies`, and `substeps`
//! are left unbound here — they're spatially assigned post-solve
//! (`spec.md` §4.5, scenario S6), not pre-assigned during scoring.

use super::util::{build_failed, candidate_bbox, scored_with_bbox};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::element::StepElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "step";
const PARTS_LIST_RADIUS: f64 = 250.0;
const NO_PARTS_LIST_SCORE: f64 = 0.55;

struct StepMarker;
impl HasElementKind for StepMarker {
    const KIND: ElementKind = ElementKind::Step;
}

pub struct StepClassifier;

impl Classifier for StepClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &["step_number", "parts_list"]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let step_numbers = scored_with_bbox(page, result, "step_number");
        let parts_lists = scored_with_bbox(page, result, "parts_list");

        for (step_number_id, step_number_bbox) in &step_numbers {
            let mut paired_with_a_list = false;
            for (parts_list_id, parts_list_bbox) in &parts_lists {
                let distance = step_number_bbox.center_distance(parts_list_bbox);
                if distance > PARTS_LIST_RADIUS {
                    continue;
                }
                paired_with_a_list = true;
                let proximity = (1.0 - distance / PARTS_LIST_RADIUS).clamp(0.0, 1.0);
                let score = (0.6 + 0.35 * proximity).clamp(0.0, 1.0);
                let id = result.next_candidate_id();
                result.add(Candidate::<StepMarker>::new_composite(
                    id,
                    LABEL,
                    score,
                    ScoreDetails::Step {
                        step_number: CandidateRef::new("step_number", *step_number_id),
                        parts_list: Some(CandidateRef::new("parts_list", *parts_list_id)),
                        diagram: None,
                        arrows: Vec::new(),
                        subassemblies: Vec::new(),
                        substeps: Vec::new(),
                    },
                ));
            }

            // A step does not strictly need a parts list (e.g. a step that
            // only repositions or rotates a model), so always also offer the
            // bare-step-number interpretation for the solver to fall back on.
            if !paired_with_a_list || parts_lists.len() > 1 {
                let id = result.next_candidate_id();
                result.add(Candidate::<StepMarker>::new_composite(
                    id,
                    LABEL,
                    NO_PARTS_LIST_SCORE,
                    ScoreDetails::Step {
                        step_number: CandidateRef::new("step_number", *step_number_id),
                        parts_list: None,
                        diagram: None,
                        arrows: Vec::new(),
                        subassemblies: Vec::new(),
                        substeps: Vec::new(),
                    },
                ));
            }
        }
    }

    fn build(
        &self,
        candidate_id: CandidateId,
        page: &PageData,
        result: &mut ClassificationResult,
    ) -> Result<LegoPageElement> {
        let Some(candidate) = result.candidate(candidate_id).cloned() else {
            return Err(build_failed(candidate_id, LABEL, "candidate missing"));
        };
        let Some(ScoreDetails::Step {
            step_number,
            parts_list,
            ..
        }) = candidate.score_details
        else {
            return Err(build_failed(candidate_id, LABEL, "missing score details"));
        };

        let step_number_elem = result
            .built_element(step_number.id)
            .cloned()
            .ok_or_else(|| build_failed(candidate_id, LABEL, "step_number child was not selected/built"))?;
        let parts_list_elem = parts_list
            .as_ref()
            .and_then(|r| result.built_element(r.id).cloned())
            .map(Box::new);

        let bbox = candidate_bbox(page, result, candidate_id).unwrap_or(*step_number_elem.bbox());
        Ok(LegoPageElement::Step(StepElem {
            bbox,
            step_number: Box::new(step_number_elem),
            parts_list: parts_list_elem,
            diagram: None,
            arrows: Vec::new(),
            subassemblies: Vec::new(),
            substeps: Vec::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::candidate::{Candidate, HasElementKind};
    use lego_core::ElementKind as EK;
    use lego_core::BBox;

    struct StepNumberMarker;
    impl HasElementKind for StepNumberMarker {
        const KIND: EK = EK::StepNumber;
    }
    struct PartsListMarker;
    impl HasElementKind for PartsListMarker {
        const KIND: EK = EK::PartsList;
    }

    fn page() -> PageData {
        PageData::new(1, 600.0, 840.0, Vec::new())
    }

    #[test]
    fn pairs_step_number_with_nearby_parts_list() {
        let mut result = ClassificationResult::new(1);
        let step_number_id = result.next_candidate_id();
        result.add(Candidate::<StepNumberMarker>::new_atomic(
            step_number_id,
            "step_number",
            0.9,
            ScoreDetails::ParsedText {
                raw_text: "1".to_string(),
            },
            0,
        ));
        let parts_list_id = result.next_candidate_id();
        result.add(Candidate::<PartsListMarker>::new_composite(
            parts_list_id,
            "parts_list",
            0.8,
            ScoreDetails::PartsList { parts: Vec::new() },
        ));

        StepClassifier.score(&page(), &DocumentHints::default(), &mut result);
        let candidates = result.get_scored_candidates(LABEL);
        assert!(!candidates.is_empty());
    }

    #[test]
    fn offers_bare_step_without_any_parts_list() {
        let mut result = ClassificationResult::new(1);
        let step_number_id = result.next_candidate_id();
        result.add(Candidate::<StepNumberMarker>::new_atomic(
            step_number_id,
            "step_number",
            0.9,
            ScoreDetails::ParsedText {
                raw_text: "1".to_string(),
            },
            0,
        ));
        StepClassifier.score(&page(), &DocumentHints::default(), &mut result);
        let candidates = result.get_scored_candidates(LABEL);
        assert_eq!(candidates.len(), 1);
        let ScoreDetails::Step { parts_list, .. } = candidates[0].score_details.clone().unwrap() else {
            panic!("expected Step details");
        };
        assert!(parts_list.is_none());
        let _ = BBox::new(0.0, 0.0, 1.0, 1.0);
    }
}
