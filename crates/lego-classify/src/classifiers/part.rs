//! `Part`: pairs a `PartCount` with the `PartImage` directly above it into
//! one parts-list row, optionally picking up a nearby `PartNumber` and
//! `PieceLength` (`spec.md` §4.2, scenario S3).
//!
//! Composite: `source_blocks` is always empty, and the set of plausible
//! pairs is scored rather than pre-assigned — a count with two candidate
//! images above it gets one `Part` candidate per image, and the solver
//! (via block exclusivity on the shared `PartImage`) picks at most one.

use super::util::{build_failed, candidate_bbox, directly_above, horizontal_overlap_fraction, nearest_within, scored_with_bbox, union2};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::element::PartElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "part";
const MAX_VERTICAL_GAP: f64 = 40.0;
const MIN_HORIZONTAL_OVERLAP: f64 = 0.25;
const NEARBY_RADIUS: f64 = 60.0;
const ALIGNMENT_TOLERANCE: f64 = 12.0;

struct PartMarker;
impl HasElementKind for PartMarker {
    const KIND: ElementKind = ElementKind::Part;
}

pub struct PartsClassifier;

impl Classifier for PartsClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &["part_count", "part_image", "part_number", "piece_length"]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let counts = scored_with_bbox(page, result, "part_count");
        let images = scored_with_bbox(page, result, "part_image");
        let numbers = scored_with_bbox(page, result, "part_number");
        let lengths = scored_with_bbox(page, result, "piece_length");

        for (count_id, count_bbox) in &counts {
            for (image_id, image_bbox) in &images {
                if !directly_above(image_bbox, count_bbox, 4.0) {
                    continue;
                }
                let vertical_gap = count_bbox.vertical_distance(image_bbox);
                if vertical_gap > MAX_VERTICAL_GAP {
                    continue;
                }
                let overlap = horizontal_overlap_fraction(image_bbox, count_bbox);
                if overlap < MIN_HORIZONTAL_OVERLAP {
                    continue;
                }

                let proximity_score = (1.0 - vertical_gap / MAX_VERTICAL_GAP).clamp(0.0, 1.0);
                let alignment_score = f64::from(image_bbox.aligned(count_bbox, ALIGNMENT_TOLERANCE, true));
                let pair_bbox = union2(*image_bbox, *count_bbox);

                let part_number = nearest_within(&numbers, &pair_bbox, NEARBY_RADIUS)
                    .map(|id| CandidateRef::new("part_number", id));
                let piece_length = nearest_within(&lengths, &pair_bbox, NEARBY_RADIUS)
                    .map(|id| CandidateRef::new("piece_length", id));

                let score = (0.5 + 0.3 * proximity_score + 0.2 * alignment_score).clamp(0.0, 1.0);
                let id = result.next_candidate_id();
                result.add(Candidate::<PartMarker>::new_composite(
                    id,
                    LABEL,
                    score,
                    ScoreDetails::Part {
                        count: CandidateRef::new("part_count", *count_id),
                        image: CandidateRef::new("part_image", *image_id),
                        part_number,
                        piece_length,
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
        let Some(ScoreDetails::Part {
            count,
            image,
            part_number,
            piece_length,
        }) = candidate.score_details
        else {
            return Err(build_failed(candidate_id, LABEL, "missing score details"));
        };

        let count_elem = result
            .built_element(count.id)
            .cloned()
            .ok_or_else(|| build_failed(candidate_id, LABEL, "part_count child was not selected/built"))?;
        let image_elem = result
            .built_element(image.id)
            .cloned()
            .ok_or_else(|| build_failed(candidate_id, LABEL, "part_image child was not selected/built"))?;
        let part_number_elem = part_number
            .as_ref()
            .and_then(|r| result.built_element(r.id).cloned())
            .map(Box::new);
        let piece_length_elem = piece_length
            .as_ref()
            .and_then(|r| result.built_element(r.id).cloned())
            .map(Box::new);

        let bbox = candidate_bbox(page, result, candidate_id).unwrap_or(*count_elem.bbox());
        Ok(LegoPageElement::Part(PartElem {
            bbox,
            count: Box::new(count_elem),
            image: Box::new(image_elem),
            part_number: part_number_elem,
            piece_length: piece_length_elem,
        }))
    }
}
