//! `SubStep`: a build stage nested inside a `SubAssembly`, optionally
//! carrying its own `SubstepNumber` and `PartsList` (`spec.md` §3, §4.2).
//!
//! Unlike `Step`, a `SubStep`'s `diagram` is never bound — the spec's
//! spatial-assignment pass (§4.5) only places `Step.diagram`/`Step.arrows`;
//! a sub-assembly's inline diagram, if any, stays with its parent `Step`.

use super::util::{build_failed, candidate_bbox, scored_with_bbox};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::element::SubStepElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "sub_step";
const PAIR_RADIUS: f64 = 150.0;

struct SubStepMarker;
impl HasElementKind for SubStepMarker {
    const KIND: ElementKind = ElementKind::SubStep;
}

pub struct SubStepClassifier;

impl Classifier for SubStepClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &["substep_number", "parts_list"]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let numbers = scored_with_bbox(page, result, "substep_number");
        let parts_lists = scored_with_bbox(page, result, "parts_list");

        for (number_id, number_bbox) in &numbers {
            let mut emitted = false;
            for (parts_list_id, parts_list_bbox) in &parts_lists {
                let distance = number_bbox.center_distance(parts_list_bbox);
                if distance > PAIR_RADIUS {
                    continue;
                }
                emitted = true;
                let proximity = (1.0 - distance / PAIR_RADIUS).clamp(0.0, 1.0);
                let score = (0.5 + 0.3 * proximity).clamp(0.0, 1.0);
                self.emit(result, Some(*number_id), Some(*parts_list_id), score);
            }
            if !emitted {
                self.emit(result, Some(*number_id), None, 0.4);
            }
        }

        // A sub-step made only of a parts list, with no number of its own,
        // is also a legal (if weaker) interpretation.
        for (parts_list_id, parts_list_bbox) in &parts_lists {
            let has_nearby_number = numbers
                .iter()
                .any(|(_, n)| n.center_distance(parts_list_bbox) <= PAIR_RADIUS);
            if !has_nearby_number {
                self.emit(result, None, Some(*parts_list_id), 0.35);
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
        let Some(ScoreDetails::SubStep {
            step_number,
            parts_list,
            diagram: _,
        }) = candidate.score_details
        else {
            return Err(build_failed(candidate_id, LABEL, "missing score details"));
        };

        let step_number_elem = step_number
            .as_ref()
            .and_then(|r| result.built_element(r.id).cloned())
            .map(Box::new);
        let parts_list_elem = parts_list
            .as_ref()
            .and_then(|r| result.built_element(r.id).cloned())
            .map(Box::new);

        let bbox = candidate_bbox(page, result, candidate_id)
            .ok_or_else(|| build_failed(candidate_id, LABEL, "a sub-step needs at least one built child"))?;
        Ok(LegoPageElement::SubStep(SubStepElem {
            bbox,
            step_number: step_number_elem,
            parts_list: parts_list_elem,
            diagram: None,
        }))
    }
}

impl SubStepClassifier {
    fn emit(
        &self,
        result: &mut ClassificationResult,
        number_id: Option<CandidateId>,
        parts_list_id: Option<CandidateId>,
        score: f64,
    ) {
        let id = result.next_candidate_id();
        result.add(Candidate::<SubStepMarker>::new_composite(
            id,
            LABEL,
            score,
            ScoreDetails::SubStep {
                step_number: number_id.map(|i| CandidateRef::new("substep_number", i)),
                parts_list: parts_list_id.map(|i| CandidateRef::new("parts_list", i)),
                diagram: None,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::candidate::{Candidate, HasElementKind};
    use lego_core::ElementKind as EK;

    struct SubstepNumberMarker;
    impl HasElementKind for SubstepNumberMarker {
        const KIND: EK = EK::SubstepNumber;
    }

    fn page() -> PageData {
        PageData::new(1, 600.0, 840.0, Vec::new())
    }

    #[test]
    fn lone_substep_number_still_gets_a_candidate() {
        let mut result = ClassificationResult::new(1);
        let number_id = result.next_candidate_id();
        result.add(Candidate::<SubstepNumberMarker>::new_atomic(
            number_id,
            "substep_number",
            0.8,
            ScoreDetails::ParsedText {
                raw_text: "1".to_string(),
            },
            0,
        ));
        SubStepClassifier.score(&page(), &DocumentHints::default(), &mut result);
        assert_eq!(result.get_scored_candidates(LABEL).len(), 1);
    }

    #[test]
    fn no_candidates_when_nothing_to_pair() {
        let mut result = ClassificationResult::new(1);
        SubStepClassifier.score(&page(), &DocumentHints::default(), &mut result);
        assert!(result.get_scored_candidates(LABEL).is_empty());
    }
}
