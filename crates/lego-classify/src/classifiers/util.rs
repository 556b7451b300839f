//! Small helpers shared by the individual classifiers: a consistent
//! `BuildFailed` constructor, source-block/child resolution against
//! `ClassificationResult` (`spec.md` §7 "parsing errors inside a classifier
//! are caught and converted into rejection reasons"), and the spatial
//! helpers the composite classifiers (`Part`, `PartsList`, `Step`,
//! `SubStep`, `SubAssembly`, `OpenBag`, `ProgressBar`) use to evaluate
//! structural opportunities among already-scored candidates without
//! pre-assigning them (`spec.md` §4.2).

use lego_core::{BBox, BlockId, CandidateId, ClassificationResult, LegoError, PageData, Result, ScoreDetails};
use std::collections::BTreeSet;

pub fn build_failed(candidate_id: CandidateId, label: &str, reason: impl Into<String>) -> LegoError {
    LegoError::BuildFailed {
        candidate_id,
        label: label.to_string(),
        reason: reason.into(),
    }
}

/// The one block an atomic candidate was built from. Atomic candidates
/// always carry exactly one source block (`Candidate::new_atomic`).
pub fn source_block(
    result: &ClassificationResult,
    candidate_id: CandidateId,
    label: &str,
) -> Result<BlockId> {
    result
        .candidate(candidate_id)
        .and_then(|c| c.source_blocks.iter().next().copied())
        .ok_or_else(|| build_failed(candidate_id, label, "candidate or its source block is missing"))
}

/// The bbox of the single block an atomic candidate wraps.
fn atomic_bbox(page: &PageData, source_blocks: &BTreeSet<BlockId>) -> Option<BBox> {
    source_blocks
        .iter()
        .next()
        .and_then(|id| page.block(*id))
        .map(|b| *b.effective_bbox())
}

/// The smallest rectangle containing both `a` and `b`.
#[must_use]
pub fn union2(a: BBox, b: BBox) -> BBox {
    BBox::new(a.x0.min(b.x0), a.y0.min(b.y0), a.x1.max(b.x1), a.y1.max(b.y1))
}

fn union_all(boxes: impl Iterator<Item = BBox>) -> Option<BBox> {
    boxes.reduce(union2)
}

/// The geometric bbox of any candidate, atomic or composite.
///
/// Atomic candidates resolve straight to their source block's
/// `effective_bbox`. Composite candidates carry `source_blocks = ∅`
/// (`spec.md` §9), so their bbox is computed by recursively unioning the
/// bboxes of the children named in `score_details` — this lets a composite
/// classifier (e.g. `PartsList` over `Part`, `SubAssembly` over `SubStep`)
/// evaluate spatial relationships among still-unbuilt composite children
/// during `score`, before the solver has selected anything.
#[must_use]
pub fn candidate_bbox(page: &PageData, result: &ClassificationResult, id: CandidateId) -> Option<BBox> {
    let candidate = result.candidate(id)?;
    if !candidate.source_blocks.is_empty() {
        return atomic_bbox(page, &candidate.source_blocks);
    }
    match candidate.score_details.as_ref()? {
        ScoreDetails::Part {
            count,
            image,
            part_number,
            piece_length,
        } => {
            let mut boxes = vec![
                candidate_bbox(page, result, count.id),
                candidate_bbox(page, result, image.id),
            ];
            if let Some(r) = part_number {
                boxes.push(candidate_bbox(page, result, r.id));
            }
            if let Some(r) = piece_length {
                boxes.push(candidate_bbox(page, result, r.id));
            }
            union_all(boxes.into_iter().flatten())
        }
        ScoreDetails::PartsList { parts } => {
            union_all(parts.iter().filter_map(|r| candidate_bbox(page, result, r.id)))
        }
        ScoreDetails::Step {
            step_number,
            parts_list,
            ..
        } => {
            let mut boxes = vec![candidate_bbox(page, result, step_number.id)];
            if let Some(r) = parts_list {
                boxes.push(candidate_bbox(page, result, r.id));
            }
            union_all(boxes.into_iter().flatten())
        }
        ScoreDetails::SubStep {
            step_number,
            parts_list,
            diagram,
        } => {
            let refs = [step_number.as_ref(), parts_list.as_ref(), diagram.as_ref()];
            union_all(
                refs.into_iter()
                    .flatten()
                    .filter_map(|r| candidate_bbox(page, result, r.id)),
            )
        }
        ScoreDetails::SubAssembly { sub_steps, .. } => {
            union_all(sub_steps.iter().filter_map(|r| candidate_bbox(page, result, r.id)))
        }
        ScoreDetails::OpenBag { bag_number, parts } => {
            let mut boxes: Vec<BBox> = bag_number
                .as_ref()
                .and_then(|r| candidate_bbox(page, result, r.id))
                .into_iter()
                .collect();
            boxes.extend(parts.iter().filter_map(|r| candidate_bbox(page, result, r.id)));
            union_all(boxes.into_iter())
        }
        ScoreDetails::ProgressBar { indicators } => {
            union_all(indicators.iter().filter_map(|r| candidate_bbox(page, result, r.id)))
        }
        ScoreDetails::Page { .. }
        | ScoreDetails::ParsedText { .. }
        | ScoreDetails::ParsedImage { .. }
        | ScoreDetails::Geometric { .. } => None,
    }
}

/// Every scored candidate of `label` paired with its resolved bbox (atomic
/// or composite); candidates whose bbox cannot be resolved are skipped.
#[must_use]
pub fn scored_with_bbox(
    page: &PageData,
    result: &ClassificationResult,
    label: &str,
) -> Vec<(CandidateId, BBox)> {
    result
        .get_scored_candidates(label)
        .iter()
        .filter_map(|c| candidate_bbox(page, result, c.id).map(|b| (c.id, b)))
        .collect()
}

/// Fraction of the narrower box's width that horizontally overlaps the
/// other — `1.0` when one box's x-extent fully contains the other's.
#[must_use]
pub fn horizontal_overlap_fraction(a: &BBox, b: &BBox) -> f64 {
    let overlap = (a.x1.min(b.x1) - a.x0.max(b.x0)).max(0.0);
    let narrower = a.width().min(b.width());
    if narrower <= 0.0 {
        0.0
    } else {
        (overlap / narrower).clamp(0.0, 1.0)
    }
}

/// True if `upper` sits above `lower` within `tolerance` points of vertical
/// gap (PDF y increases downward, so "above" means smaller y).
#[must_use]
pub fn directly_above(upper: &BBox, lower: &BBox, tolerance: f64) -> bool {
    upper.y1 <= lower.y0 + tolerance
}

/// The id of the candidate in `pool` whose bbox-center is nearest to
/// `anchor`'s and within `radius`, if any.
#[must_use]
pub fn nearest_within(pool: &[(CandidateId, BBox)], anchor: &BBox, radius: f64) -> Option<CandidateId> {
    pool.iter()
        .map(|(id, bbox)| (*id, anchor.center_distance(bbox)))
        .filter(|(_, dist)| *dist <= radius)
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_combines_extremes() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, -5.0, 20.0, 8.0);
        let u = union2(a, b);
        assert_eq!(u, BBox::new(0.0, -5.0, 20.0, 10.0));
    }

    #[test]
    fn horizontal_overlap_full_when_nested() {
        let outer = BBox::new(0.0, 0.0, 100.0, 10.0);
        let inner = BBox::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(horizontal_overlap_fraction(&outer, &inner), 1.0);
    }

    #[test]
    fn directly_above_allows_small_tolerance() {
        let image = BBox::new(0.0, 0.0, 10.0, 10.0);
        let text = BBox::new(0.0, 12.0, 10.0, 20.0);
        assert!(directly_above(&image, &text, 5.0));
        assert!(!directly_above(&image, &text, 1.0));
    }
}

