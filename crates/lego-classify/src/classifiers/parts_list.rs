//! `PartsList`: the vector-drawn panel grouping a step's `Part`s
//! (`spec.md` §4.2, scenario S3).
//!
//! For each vector `Drawing` block that could be a parts-list container,
//! enumerates the `Part` candidates whose bbox is `fully_inside` it and
//! scores the container by how many it contains and how much of its area
//! they cover.

use super::util::{build_failed, scored_with_bbox, union2};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::element::PartsListElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};

const LABEL: &str = "parts_list";
const MIN_CONTAINER_AREA: f64 = 1_500.0;

struct PartsListMarker;
impl HasElementKind for PartsListMarker {
    const KIND: ElementKind = ElementKind::PartsList;
}

pub struct PartsListClassifier;

impl Classifier for PartsListClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &["part"]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let parts = scored_with_bbox(page, result, "part");
        if parts.is_empty() {
            return;
        }

        for block in page.blocks() {
            if !block.is_drawing() {
                continue;
            }
            let container = *block.effective_bbox();
            if container.area() < MIN_CONTAINER_AREA {
                continue;
            }

            let contained: Vec<CandidateId> = parts
                .iter()
                .filter(|(_, bbox)| bbox.fully_inside(&container))
                .map(|(id, _)| *id)
                .collect();
            if contained.is_empty() {
                continue;
            }

            let covered_area: f64 = parts
                .iter()
                .filter(|(id, _)| contained.contains(id))
                .map(|(_, bbox)| bbox.area())
                .sum();
            let coverage = (covered_area / container.area()).clamp(0.0, 1.0);
            let count_score = (contained.len() as f64 / 6.0).clamp(0.0, 1.0);
            let score = (0.4 + 0.35 * count_score + 0.25 * coverage).clamp(0.0, 1.0);

            let id = result.next_candidate_id();
            result.add(Candidate::<PartsListMarker>::new_composite(
                id,
                LABEL,
                score,
                ScoreDetails::PartsList {
                    parts: contained.into_iter().map(|pid| CandidateRef::new("part", pid)).collect(),
                },
            ));
        }
    }

    fn build(
        &self,
        candidate_id: CandidateId,
        _page: &PageData,
        result: &mut ClassificationResult,
    ) -> Result<LegoPageElement> {
        let Some(candidate) = result.candidate(candidate_id).cloned() else {
            return Err(build_failed(candidate_id, LABEL, "candidate missing"));
        };
        let Some(ScoreDetails::PartsList { parts }) = candidate.score_details else {
            return Err(build_failed(candidate_id, LABEL, "missing score details"));
        };
        if parts.is_empty() {
            return Err(build_failed(candidate_id, LABEL, "a parts list needs at least one part"));
        }

        let mut built_parts = Vec::with_capacity(parts.len());
        let mut bbox = None;
        for part_ref in &parts {
            let elem = result
                .built_element(part_ref.id)
                .cloned()
                .ok_or_else(|| build_failed(candidate_id, LABEL, "a referenced part was not selected/built"))?;
            bbox = Some(match bbox {
                Some(existing) => union2(existing, *elem.bbox()),
                None => *elem.bbox(),
            });
            built_parts.push(elem);
        }

        Ok(LegoPageElement::PartsList(PartsListElem {
            bbox: bbox.expect("non-empty parts checked above"),
            parts: built_parts,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::candidate::{Candidate, HasElementKind};
    use lego_core::element::{PartCountElem, PartImageElem};
    use lego_core::{Block, BBox};

    struct PartCountMarker;
    impl HasElementKind for PartCountMarker {
        const KIND: ElementKind = ElementKind::PartCount;
    }
    struct PartImageMarker;
    impl HasElementKind for PartImageMarker {
        const KIND: ElementKind = ElementKind::PartImage;
    }
    struct PartMarker;
    impl HasElementKind for PartMarker {
        const KIND: ElementKind = ElementKind::Part;
    }

    fn scored_part(result: &mut ClassificationResult, bbox: BBox, block_id: u64) -> CandidateId {
        let count_id = result.next_candidate_id();
        result.add(Candidate::<PartCountMarker>::new_atomic(
            count_id,
            "part_count",
            0.9,
            ScoreDetails::ParsedText {
                raw_text: "4x".to_string(),
            },
            block_id,
        ));
        let image_id = result.next_candidate_id();
        result.add(Candidate::<PartImageMarker>::new_atomic(
            image_id,
            "part_image",
            0.8,
            ScoreDetails::ParsedImage {
                image_id: "img".to_string(),
            },
            block_id + 100,
        ));
        let part_id = result.next_candidate_id();
        result.add(Candidate::<PartMarker>::new_composite(
            part_id,
            "part",
            0.85,
            ScoreDetails::Part {
                count: CandidateRef::new("part_count", count_id),
                image: CandidateRef::new("part_image", image_id),
                part_number: None,
                piece_length: None,
            },
        ));
        // candidate_bbox resolves through the referenced children, so give
        // them real blocks on the page to union.
        let _ = bbox;
        part_id
    }

    fn page_with_container() -> PageData {
        PageData::new(
            1,
            600.0,
            840.0,
            vec![
                Block::Drawing {
                    id: 9,
                    bbox: BBox::new(0.0, 0.0, 200.0, 200.0),
                    original_bbox: None,
                    paths: None,
                    fill_color: None,
                    stroke_color: None,
                    thickness: None,
                },
                Block::Image {
                    id: 100,
                    bbox: BBox::new(10.0, 10.0, 40.0, 40.0),
                    image_id: "i1".to_string(),
                },
                Block::Text {
                    id: 0,
                    bbox: BBox::new(10.0, 45.0, 30.0, 55.0),
                    text: "4x".to_string(),
                    font_size: 8.0,
                    font_name: "Helvetica".to_string(),
                },
            ],
        )
    }

    #[test]
    fn wraps_contained_parts() {
        let page = page_with_container();
        let mut result = ClassificationResult::new(1);
        scored_part(&mut result, BBox::new(10.0, 10.0, 40.0, 55.0), 0);
        PartsListClassifier.score(&page, &DocumentHints::default(), &mut result);
        let candidates = result.get_scored_candidates(LABEL);
        assert_eq!(candidates.len(), 1);
        let ScoreDetails::PartsList { parts } = candidates[0].score_details.clone().unwrap() else {
            panic!("expected PartsList details");
        };
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn ignores_tiny_drawing_as_container() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![Block::Drawing {
                id: 9,
                bbox: BBox::new(0.0, 0.0, 5.0, 5.0),
                original_bbox: None,
                paths: None,
                fill_color: None,
                stroke_color: None,
                thickness: None,
            }],
        );
        let mut result = ClassificationResult::new(1);
        scored_part(&mut result, BBox::new(0.0, 0.0, 1.0, 1.0), 0);
        PartsListClassifier.score(&page, &DocumentHints::default(), &mut result);
        assert!(result.get_scored_candidates(LABEL).is_empty());
    }
}
