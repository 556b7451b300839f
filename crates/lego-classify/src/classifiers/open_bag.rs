//! `OpenBag`: the "open a new numbered bag" glyph together with the parts
//! it introduces (`spec.md` §4.2).
//!
//! Each glyph offers two variant candidates — `greedy` (parts within a wide
//! radius) and `conservative` (parts within a narrow radius) — since how far
//! a bag's parts can be scattered on the page varies by layout and the
//! pipeline has no way to know in advance which radius is correct. The two
//! variants are declared mutually exclusive so the solver picks at most one
//! per glyph.

use super::geometry_shape::{aspect_ratio, proximity};
use super::util::{build_failed, candidate_bbox, scored_with_bbox};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::element::OpenBagElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails, SemanticConstraint,
};

const LABEL: &str = "open_bag";
const MIN_DIMENSION: f64 = 14.0;
const MAX_DIMENSION: f64 = 36.0;
const BAG_NUMBER_RADIUS: f64 = 50.0;
const GREEDY_RADIUS: f64 = 180.0;
const CONSERVATIVE_RADIUS: f64 = 90.0;

struct OpenBagMarker;
impl HasElementKind for OpenBagMarker {
    const KIND: ElementKind = ElementKind::OpenBag;
}

pub struct OpenBagClassifier;

impl Classifier for OpenBagClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &["bag_number", "part"]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let bag_numbers = scored_with_bbox(page, result, "bag_number");
        let parts = scored_with_bbox(page, result, "part");

        for block in page.blocks() {
            if !block.is_drawing() {
                continue;
            }
            let bbox = block.bbox();
            if bbox.width() < MIN_DIMENSION
                || bbox.width() > MAX_DIMENSION
                || bbox.height() < MIN_DIMENSION
                || bbox.height() > MAX_DIMENSION
            {
                continue;
            }
            let squareness = proximity(aspect_ratio(bbox), 1.0, 0.35);
            if squareness <= 0.0 {
                continue;
            }

            let bag_number = bag_numbers
                .iter()
                .filter(|(_, nb)| nb.center_distance(bbox) <= BAG_NUMBER_RADIUS)
                .min_by(|(_, a), (_, b)| {
                    a.center_distance(bbox)
                        .partial_cmp(&b.center_distance(bbox))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(id, _)| CandidateRef::new("bag_number", *id));

            self.emit(
                result,
                bag_number.clone(),
                parts_within(&parts, bbox, GREEDY_RADIUS),
                0.3 + 0.3 * squareness,
            );
            self.emit(
                result,
                bag_number,
                parts_within(&parts, bbox, CONSERVATIVE_RADIUS),
                0.3 + 0.35 * squareness,
            );
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
        let Some(ScoreDetails::OpenBag { bag_number, parts }) = candidate.score_details else {
            return Err(build_failed(candidate_id, LABEL, "missing score details"));
        };

        let bag_number_elem = bag_number
            .as_ref()
            .and_then(|r| result.built_element(r.id).cloned())
            .map(Box::new);
        let mut built_parts = Vec::with_capacity(parts.len());
        for r in &parts {
            let elem = result
                .built_element(r.id)
                .cloned()
                .ok_or_else(|| build_failed(candidate_id, LABEL, "a referenced part was not selected/built"))?;
            built_parts.push(elem);
        }

        let bbox = candidate_bbox(page, result, candidate_id)
            .or_else(|| bag_number_elem.as_ref().map(|e| *e.bbox()))
            .ok_or_else(|| build_failed(candidate_id, LABEL, "an open-bag glyph needs a resolvable bbox"))?;
        Ok(LegoPageElement::OpenBag(OpenBagElem {
            bbox,
            bag_number: bag_number_elem,
            parts: built_parts,
        }))
    }

    /// Each glyph emits exactly one greedy and one conservative candidate
    /// back to back (`score` above), so consecutive ids of this label are
    /// always the two variants of the same glyph — there is no direct
    /// glyph-id field on `ScoreDetails::OpenBag` to group by instead.
    fn declare_constraints(&self, result: &ClassificationResult) -> Vec<SemanticConstraint> {
        let mut candidates = result.get_scored_candidates(LABEL);
        candidates.sort_by_key(|c| c.id);
        candidates
            .chunks_exact(2)
            .map(|pair| SemanticConstraint::MutuallyExclusive {
                ids: vec![pair[0].id, pair[1].id],
            })
            .collect()
    }
}

impl OpenBagClassifier {
    fn emit(
        &self,
        result: &mut ClassificationResult,
        bag_number: Option<CandidateRef>,
        parts: Vec<CandidateRef>,
        score: f64,
    ) -> CandidateId {
        let id = result.next_candidate_id();
        result.add(Candidate::<OpenBagMarker>::new_composite(
            id,
            LABEL,
            score.clamp(0.0, 1.0),
            ScoreDetails::OpenBag { bag_number, parts },
        ));
        id
    }
}

fn parts_within(parts: &[(CandidateId, lego_core::BBox)], anchor: &lego_core::BBox, radius: f64) -> Vec<CandidateRef> {
    parts
        .iter()
        .filter(|(_, bbox)| anchor.center_distance(bbox) <= radius)
        .map(|(id, _)| CandidateRef::new("part", *id))
        .collect()
}
