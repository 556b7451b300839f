//! Schema-driven structural constraint generation.
//!
//! Reflects over every selected-eligible candidate's `ScoreDetails` to
//! auto-emit the structural implications `spec.md` §4.3 describes ("parent_var
//! ⇒ child_var(s) with the cardinality implied by the field kind"). Rust has
//! no runtime reflection, so unlike a dynamically-typed original this walks a
//! fixed `match` over the `ScoreDetails` enum rather than iterating struct
//! fields by name — the `ElementKind` tag on every candidate plays the role
//! the design note's "run-time type tag `element_type_id`" describes, letting
//! [`block_exclusivity_constraints`] and the orphan-prevention helper below
//! match by element type without consulting field names.
//!
//! Fields the individual classifiers leave structurally unbound because
//! they're resolved by spatial assignment instead (`Step.diagram`,
//! `Step.arrows`, `Step.subassemblies`) are never populated in
//! `ScoreDetails::Step` at score time, so no implication is generated for
//! them here — exactly the `'field': {'assignment': 'spatial'}` escape hatch
//! in `spec.md` §4.3.

use crate::engine::{Cardinality, Constraint};
use lego_core::{CandidateId, ClassificationResult, ScoreDetails, SemanticConstraint};
use rustc_hash::FxHashMap;

/// Emit every structural constraint implied by the composite candidates
/// currently in `result`.
#[must_use]
pub fn structural_constraints(result: &ClassificationResult) -> Vec<Constraint> {
    let mut out = Vec::new();
    for candidate in result.all_candidates() {
        let Some(details) = &candidate.score_details else {
            continue;
        };
        match details {
            ScoreDetails::Part {
                count,
                image,
                part_number,
                piece_length,
            } => {
                out.push(Constraint::implies(candidate.id, count.id));
                out.push(Constraint::implies(candidate.id, image.id));
                if let Some(r) = part_number {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
                if let Some(r) = piece_length {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
            }
            ScoreDetails::PartsList { parts } => {
                if !parts.is_empty() {
                    out.push(Constraint::IfSelectedThen {
                        parent: candidate.id,
                        children: parts.iter().map(|r| r.id).collect(),
                        cardinality: Cardinality::AtLeast(1),
                    });
                }
            }
            ScoreDetails::Step {
                step_number,
                parts_list,
                diagram: _,
                arrows: _,
                subassemblies: _,
                substeps: _,
            } => {
                out.push(Constraint::implies(candidate.id, step_number.id));
                if let Some(r) = parts_list {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
            }
            ScoreDetails::SubStep {
                step_number,
                parts_list,
                diagram: _,
            } => {
                if let Some(r) = step_number {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
                if let Some(r) = parts_list {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
            }
            ScoreDetails::SubAssembly { sub_steps, .. } => {
                for r in sub_steps {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
            }
            ScoreDetails::OpenBag { bag_number, parts } => {
                if let Some(r) = bag_number {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
                if !parts.is_empty() {
                    out.push(Constraint::IfSelectedThen {
                        parent: candidate.id,
                        children: parts.iter().map(|r| r.id).collect(),
                        cardinality: Cardinality::AtLeast(1),
                    });
                }
            }
            ScoreDetails::ProgressBar { indicators } => {
                for r in indicators {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
            }
            ScoreDetails::Page { page_number, steps, .. } => {
                if let Some(r) = page_number {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
                for r in steps {
                    out.push(Constraint::implies(candidate.id, r.id));
                }
            }
            ScoreDetails::ParsedText { .. }
            | ScoreDetails::ParsedImage { .. }
            | ScoreDetails::Geometric { .. } => {}
        }
    }
    out
}

/// Lower the block-exclusivity invariant (`spec.md` §3 invariant 1 / §4.4
/// `add_block_exclusivity_constraints`) into one constraint per block: the
/// sum of selection over every candidate whose `source_blocks` contains that
/// block is at most one. Composite candidates (`source_blocks = ∅`)
/// contribute no direct term, so exclusivity flows transitively through
/// their atomic children via the structural implications above.
#[must_use]
pub fn block_exclusivity_constraints(result: &ClassificationResult) -> Vec<Constraint> {
    let mut by_block: FxHashMap<u64, Vec<CandidateId>> = FxHashMap::default();
    for candidate in result.all_candidates() {
        if candidate.score_details.is_none() {
            continue;
        }
        for block in &candidate.source_blocks {
            by_block.entry(*block).or_default().push(candidate.id);
        }
    }
    by_block
        .into_iter()
        .filter(|(_, candidates)| candidates.len() > 1)
        .map(|(block, candidates)| Constraint::BlockExclusivity { block, candidates })
        .collect()
}

/// Lower classifier-declared semantic constraints into the engine's
/// vocabulary.
#[must_use]
pub fn semantic_constraints(
    result: &ClassificationResult,
    declared: &[SemanticConstraint],
) -> Vec<Constraint> {
    let mut out = Vec::new();
    for constraint in declared {
        match constraint {
            SemanticConstraint::UniqueBy { groups, .. } => {
                for group in groups {
                    if group.len() > 1 {
                        out.push(Constraint::AtMostOneOf(group.clone()));
                    }
                }
            }
            SemanticConstraint::NoOrphans {
                child_label,
                parent_label,
            } => {
                let group: Vec<CandidateId> = result
                    .get_scored_candidates(child_label)
                    .iter()
                    .map(|c| c.id)
                    .collect();
                let parents: Vec<CandidateId> = result
                    .get_scored_candidates(parent_label)
                    .iter()
                    .map(|c| c.id)
                    .collect();
                if !group.is_empty() {
                    out.push(Constraint::IfAnySelectedThenOneOf { group, parents });
                }
            }
            SemanticConstraint::MutuallyExclusive { ids } => {
                for i in 0..ids.len() {
                    for j in (i + 1)..ids.len() {
                        out.push(Constraint::MutuallyExclusive(ids[i], ids[j]));
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
    use lego_core::ElementKind;

    struct PartMarker;
    impl HasElementKind for PartMarker {
        const KIND: ElementKind = ElementKind::Part;
    }
    struct PartCountMarker;
    impl HasElementKind for PartCountMarker {
        const KIND: ElementKind = ElementKind::PartCount;
    }

    #[test]
    fn part_composite_implies_its_count_and_image() {
        let mut result = ClassificationResult::new(1);
        let count_id = result.next_candidate_id();
        result.add(Candidate::<PartCountMarker>::new_atomic(
            count_id,
            "part_count",
            0.9,
            ScoreDetails::ParsedText {
                raw_text: "4x".to_string(),
            },
            0,
        ));
        let image_id = result.next_candidate_id();
        result.add(Candidate::<PartCountMarker>::new_atomic(
            image_id,
            "part_image",
            0.8,
            ScoreDetails::ParsedImage {
                image_id: "img1".to_string(),
            },
            1,
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

        let constraints = structural_constraints(&result);
        assert!(constraints.contains(&Constraint::implies(part_id, count_id)));
        assert!(constraints.contains(&Constraint::implies(part_id, image_id)));
    }

    #[test]
    fn block_exclusivity_only_emitted_for_shared_blocks() {
        let mut result = ClassificationResult::new(1);
        let a = result.next_candidate_id();
        result.add(Candidate::<PartCountMarker>::new_atomic(
            a,
            "part_count",
            0.8,
            ScoreDetails::ParsedText {
                raw_text: "4x".to_string(),
            },
            7,
        ));
        let b = result.next_candidate_id();
        result.add(Candidate::<PartCountMarker>::new_atomic(
            b,
            "bag_number",
            0.7,
            ScoreDetails::ParsedText {
                raw_text: "4".to_string(),
            },
            7,
        ));
        let constraints = block_exclusivity_constraints(&result);
        assert_eq!(constraints.len(), 1);
    }
}
