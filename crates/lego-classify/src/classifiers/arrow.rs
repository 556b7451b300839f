//! `Arrow`: the directional indicator showing where a piece attaches
//! (`spec.md` §4.2, scenario S5 — an `Arrow` with no viable `Step` on the
//! page must not be selected).

use super::geometry_shape::aspect_ratio;
use super::util::{build_failed, source_block};
use crate::classifier::Classifier;
use lego_core::candidate::{Candidate, HasElementKind};
use lego_core::element::ArrowElem;
use lego_core::{
    CandidateId, ClassificationResult, DocumentHints, ElementKind, LegoPageElement, PageData,
    Result, ScoreDetails, SemanticConstraint,
};

const LABEL: &str = "arrow";
const MIN_ASPECT: f64 = 1.8;
const MAX_DIMENSION: f64 = 80.0;

struct ArrowMarker;
impl HasElementKind for ArrowMarker {
    const KIND: ElementKind = ElementKind::Arrow;
}

pub struct ArrowClassifier;

impl Classifier for ArrowClassifier {
    fn output(&self) -> &'static str {
        LABEL
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, page: &PageData, _hints: &DocumentHints, result: &mut ClassificationResult) {
        for block in page.blocks() {
            if !block.is_drawing() {
                continue;
            }
            let bbox = block.bbox();
            if bbox.width() > MAX_DIMENSION && bbox.height() > MAX_DIMENSION {
                continue;
            }
            let ratio = aspect_ratio(bbox);
            let elongation = ratio.max(1.0 / ratio.max(f64::EPSILON));
            if elongation < MIN_ASPECT {
                continue;
            }
            let score = (0.3 + 0.05 * elongation).min(0.8);
            let id = result.next_candidate_id();
            result.add(Candidate::<ArrowMarker>::new_atomic(
                id,
                LABEL,
                score,
                ScoreDetails::Geometric {
                    note: "elongated directional shape".to_string(),
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
        let direction_degrees = match block {
            lego_core::Block::Drawing {
                paths: Some(points),
                ..
            } => direction_from_path(points),
            _ => None,
        };
        Ok(LegoPageElement::Arrow(ArrowElem {
            bbox: *block.bbox(),
            direction_degrees,
        }))
    }

    /// An `Arrow` with no `Step` anywhere on the page is never selected
    /// (`spec.md` §3 invariant 5, §8 S5).
    fn declare_constraints(&self, _result: &ClassificationResult) -> Vec<SemanticConstraint> {
        vec![SemanticConstraint::NoOrphans {
            child_label: LABEL.to_string(),
            parent_label: "step".to_string(),
        }]
    }
}

fn direction_from_path(points: &[(f64, f64)]) -> Option<f64> {
    let (x0, y0) = *points.first()?;
    let (x1, y1) = *points.last()?;
    if (x0, y0) == (x1, y1) {
        return None;
    }
    Some((y1 - y0).atan2(x1 - x0).to_degrees())
}
