//! Post-build spatial assignment: binds solver-selected `Diagram` and
//! `Arrow` candidates into the `Step`s they visually belong to
//! (`spec.md` §4.5, scenarios S5/S6).
//!
//! Diagrams are placed with Kuhn-Munkres (`lego_solver::assignment::assign`)
//! since the documented contested scenario (S6: two steps, one diagram) is
//! exactly a 1-capacity bipartite matching problem. Arrows have no
//! documented capacity limit per step, so they're placed by simple
//! nearest-step distance rather than paying for a matching problem with an
//! unbounded capacity (which degenerates to the same result).

use lego_core::{BBox, CandidateId, ClassificationResult, LegoPageElement};
use lego_solver::{assign, center_distance_cost, PoolMember, Slot};
use rustc_hash::FxHashMap;

fn selected_built(result: &ClassificationResult, label: &str) -> Vec<(CandidateId, BBox)> {
    let mut out: Vec<(CandidateId, BBox)> = result
        .all_candidates()
        .filter(|c| c.label == label && result.selected_candidate_ids().contains(&c.id))
        .filter_map(|c| result.built_element(c.id).map(|e| (c.id, *e.bbox())))
        .collect();
    out.sort_by_key(|(id, _)| *id);
    out
}

/// What `assign_into_steps` could not place into any `Step`, by kind —
/// destined for the page's standalone collections.
pub struct UnassignedSpatial {
    pub diagrams: Vec<CandidateId>,
    pub arrows: Vec<CandidateId>,
    pub subassemblies: Vec<CandidateId>,
    pub substeps: Vec<CandidateId>,
}

/// Assign diagrams, arrows, sub-assemblies, and sub-steps into steps,
/// mutating the already-built `Step` elements in `result` in place.
pub fn assign_into_steps(result: &mut ClassificationResult) -> UnassignedSpatial {
    let steps = selected_built(result, "step");
    let diagrams = selected_built(result, "diagram");
    let arrows = selected_built(result, "arrow");
    let subassemblies = selected_built(result, "sub_assembly");
    let substeps = selected_built(result, "sub_step");

    let diagram_assignment = if steps.is_empty() || diagrams.is_empty() {
        FxHashMap::default()
    } else {
        let slots: Vec<Slot> = steps
            .iter()
            .map(|(id, bbox)| Slot {
                id: *id,
                bbox: *bbox,
                capacity: 1,
            })
            .collect();
        let pool: Vec<PoolMember> = diagrams
            .iter()
            .map(|(id, bbox)| PoolMember { id: *id, bbox: *bbox })
            .collect();
        assign(&slots, &pool, center_distance_cost)
    };

    let arrow_assignment = nearest_step_assignment(&steps, &arrows);
    let subassembly_assignment = nearest_step_assignment(&steps, &subassemblies);
    let substep_assignment = nearest_step_assignment(&steps, &substeps);

    for (step_id, _) in &steps {
        let assigned_diagram = diagram_assignment
            .iter()
            .find(|(_, s)| *s == step_id)
            .map(|(d, _)| *d);
        let assigned_arrows = members_of(&arrow_assignment, *step_id);
        let assigned_subassemblies = members_of(&subassembly_assignment, *step_id);
        let assigned_substeps = members_of(&substep_assignment, *step_id);
        if assigned_diagram.is_none()
            && assigned_arrows.is_empty()
            && assigned_subassemblies.is_empty()
            && assigned_substeps.is_empty()
        {
            continue;
        }
        if let Some(LegoPageElement::Step(mut step_elem)) = result.built_element(*step_id).cloned() {
            if let Some(diagram_id) = assigned_diagram {
                step_elem.diagram = result.built_element(diagram_id).cloned().map(Box::new);
            }
            if !assigned_arrows.is_empty() {
                step_elem.arrows = resolve_built(result, assigned_arrows);
            }
            if !assigned_subassemblies.is_empty() {
                step_elem.subassemblies = resolve_built(result, assigned_subassemblies);
            }
            if !assigned_substeps.is_empty() {
                step_elem.substeps = resolve_built(result, assigned_substeps);
            }
            result.mark_built(*step_id, LegoPageElement::Step(step_elem));
        }
    }

    let unassigned_diagrams: Vec<CandidateId> = diagrams
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| !diagram_assignment.contains_key(id))
        .collect();
    let unassigned_arrows: Vec<CandidateId> = arrows
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| !arrow_assignment.contains_key(id))
        .collect();
    let unassigned_subassemblies: Vec<CandidateId> = subassemblies
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| !subassembly_assignment.contains_key(id))
        .collect();
    let unassigned_substeps: Vec<CandidateId> = substeps
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| !substep_assignment.contains_key(id))
        .collect();

    UnassignedSpatial {
        diagrams: unassigned_diagrams,
        arrows: unassigned_arrows,
        subassemblies: unassigned_subassemblies,
        substeps: unassigned_substeps,
    }
}

/// Nearest-step assignment with no capacity limit, for element kinds with no
/// documented contested-assignment scenario (unlike `Diagram`/`Step`, see
/// `spec.md` S6) — the same pattern as arrow placement, generalized.
fn nearest_step_assignment(
    steps: &[(CandidateId, BBox)],
    members: &[(CandidateId, BBox)],
) -> FxHashMap<CandidateId, CandidateId> {
    let mut assignment = FxHashMap::default();
    for (member_id, member_bbox) in members {
        if let Some((step_id, _)) = steps.iter().min_by(|(_, a), (_, b)| {
            member_bbox
                .center_distance(a)
                .partial_cmp(&member_bbox.center_distance(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
            assignment.insert(*member_id, *step_id);
        }
    }
    assignment
}

fn members_of(assignment: &FxHashMap<CandidateId, CandidateId>, step_id: CandidateId) -> Vec<CandidateId> {
    let mut ids: Vec<CandidateId> = assignment
        .iter()
        .filter(|(_, s)| **s == step_id)
        .map(|(m, _)| *m)
        .collect();
    ids.sort_unstable();
    ids
}

fn resolve_built(result: &ClassificationResult, ids: Vec<CandidateId>) -> Vec<LegoPageElement> {
    ids.into_iter()
        .filter_map(|id| result.built_element(id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lego_core::candidate::{Candidate, HasElementKind};
    use lego_core::element::{DiagramElem, StepElem, StepNumberElem};
    use lego_core::{CandidateRef, ElementKind, ScoreDetails};

    struct StepMarker;
    impl HasElementKind for StepMarker {
        const KIND: ElementKind = ElementKind::Step;
    }
    struct StepNumberMarker;
    impl HasElementKind for StepNumberMarker {
        const KIND: ElementKind = ElementKind::StepNumber;
    }
    struct DiagramMarker;
    impl HasElementKind for DiagramMarker {
        const KIND: ElementKind = ElementKind::Diagram;
    }

    fn build_step(result: &mut ClassificationResult, bbox: BBox) -> CandidateId {
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
        result.select(step_number_id);
        result.mark_built(
            step_number_id,
            LegoPageElement::StepNumber(StepNumberElem { bbox, value: 1 }),
        );

        let step_id = result.next_candidate_id();
        result.add(Candidate::<StepMarker>::new_composite(
            step_id,
            "step",
            0.9,
            ScoreDetails::Step {
                step_number: CandidateRef::new("step_number", step_number_id),
                parts_list: None,
                diagram: None,
                arrows: Vec::new(),
                subassemblies: Vec::new(),
                substeps: Vec::new(),
            },
        ));
        result.select(step_id);
        result.mark_built(
            step_id,
            LegoPageElement::Step(StepElem {
                bbox,
                step_number: Box::new(LegoPageElement::StepNumber(StepNumberElem {
                    bbox,
                    value: 1,
                })),
                parts_list: None,
                diagram: None,
                arrows: Vec::new(),
                subassemblies: Vec::new(),
                substeps: Vec::new(),
            }),
        );
        step_id
    }

    fn build_diagram(result: &mut ClassificationResult, bbox: BBox) -> CandidateId {
        let id = result.next_candidate_id();
        result.add(Candidate::<DiagramMarker>::new_atomic(
            id,
            "diagram",
            0.9,
            ScoreDetails::Geometric {
                note: "drawing".to_string(),
            },
            id + 1000,
        ));
        result.select(id);
        result.mark_built(id, LegoPageElement::Diagram(DiagramElem { bbox, image_id: None }));
        id
    }

    #[test]
    fn closer_step_wins_a_contested_diagram() {
        let mut result = ClassificationResult::new(1);
        let near_step = build_step(&mut result, BBox::new(0.0, 0.0, 10.0, 10.0));
        let far_step = build_step(&mut result, BBox::new(200.0, 200.0, 210.0, 210.0));
        let diagram = build_diagram(&mut result, BBox::new(1.0, 1.0, 11.0, 11.0));

        let unassigned = assign_into_steps(&mut result);
        assert!(unassigned.diagrams.is_empty());

        let near = result.built_element(near_step).unwrap();
        let LegoPageElement::Step(near) = near else {
            panic!("expected step")
        };
        assert!(near.diagram.is_some());

        let far = result.built_element(far_step).unwrap();
        let LegoPageElement::Step(far) = far else {
            panic!("expected step")
        };
        assert!(far.diagram.is_none());
        let _ = diagram;
    }
}
