//! `SubAssembly`: a light-filled panel that groups one or more `SubStep`s
//! building an intermediate piece before it's folded into the main model
//! (`spec.md` §4.2).
//!
//! Detected the same way `PartsList` detects its container — a vector
//! `Drawing` block — but distinguished by a light (not necessarily
//! rectangular-text-heavy) fill and an optional leading `"Nx"`-style step
//! count reusing `PartCount`'s pattern semantics.

use super::geometry_shape::darkness;
use super::util::{build_failed, scored_with_bbox};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::element::SubAssemblyElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails,
};
use once_cell::sync::Lazy;
use regex::Regex;

static STEP_COUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{1,3})\s*[x×]$").unwrap());

const LABEL: &str = "sub_assembly";
const MIN_CONTAINER_AREA: f64 = 1_200.0;
const LIGHT_THRESHOLD: f64 = 0.35;

struct SubAssemblyMarker;
impl HasElementKind for SubAssemblyMarker {
    const KIND: ElementKind = ElementKind::SubAssembly;
}

pub struct SubAssemblyClassifier;

impl Classifier for SubAssemblyClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &["sub_step"]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        let sub_steps = scored_with_bbox(page, result, "sub_step");
        if sub_steps.is_empty() {
            return;
        }

        for block in page.blocks() {
            let lego_core::Block::Drawing { fill_color, .. } = block else {
                continue;
            };
            let Some(color) = fill_color else {
                continue;
            };
            if darkness(*color) > LIGHT_THRESHOLD {
                continue;
            }
            let container = *block.effective_bbox();
            if container.area() < MIN_CONTAINER_AREA {
                continue;
            }

            let contained: Vec<CandidateId> = sub_steps
                .iter()
                .filter(|(_, bbox)| bbox.fully_inside(&container))
                .map(|(id, _)| *id)
                .collect();
            if contained.is_empty() {
                continue;
            }

            let step_count = nearby_step_count(page, &container);
            let count_score = (contained.len() as f64 / 3.0).clamp(0.0, 1.0);
            let score = (0.45 + 0.35 * count_score + if step_count.is_some() { 0.1 } else { 0.0 })
                .clamp(0.0, 1.0);

            let id = result.next_candidate_id();
            result.add(Candidate::<SubAssemblyMarker>::new_composite(
                id,
                LABEL,
                score,
                ScoreDetails::SubAssembly {
                    step_count,
                    sub_steps: contained.into_iter().map(|sid| CandidateRef::new("sub_step", sid)).collect(),
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
        let Some(ScoreDetails::SubAssembly { step_count, sub_steps }) = candidate.score_details else {
            return Err(build_failed(candidate_id, LABEL, "missing score details"));
        };
        if sub_steps.is_empty() {
            return Err(build_failed(candidate_id, LABEL, "a sub-assembly needs at least one sub-step"));
        }

        let mut built = Vec::with_capacity(sub_steps.len());
        let mut bbox = None;
        for r in &sub_steps {
            let elem = result
                .built_element(r.id)
                .cloned()
                .ok_or_else(|| build_failed(candidate_id, LABEL, "a referenced sub-step was not selected/built"))?;
            bbox = Some(match bbox {
                Some(existing) => super::util::union2(existing, *elem.bbox()),
                None => *elem.bbox(),
            });
            built.push(elem);
        }

        Ok(LegoPageElement::SubAssembly(SubAssemblyElem {
            bbox: bbox.expect("non-empty sub_steps checked above"),
            step_count,
            sub_steps: built,
        }))
    }
}

fn nearby_step_count(page: &PageData, container: &lego_core::BBox) -> Option<u32> {
    page.blocks().iter().find_map(|block| {
        let (text, ..) = block.as_text()?;
        let trimmed = text.trim();
        if !STEP_COUNT_PATTERN.is_match(trimmed) {
            return None;
        }
        if !block.bbox().fully_inside(container) {
            return None;
        }
        STEP_COUNT_PATTERN
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}
