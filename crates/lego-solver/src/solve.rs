//! Top-level per-page solve: wires the schema constraint generator, the
//! constraint engine, and the per-label greedy fallback together under one
//! `SolverConfig` (`spec.md` §4.4 "per-label opt-in").

use crate::config::SolverConfig;
use crate::engine::{ConstraintModel, Constraint, ModelVar, SolveOutcome};
use crate::schema::{block_exclusivity_constraints, semantic_constraints, structural_constraints};
use lego_core::{BlockId, CandidateId, ClassificationResult, SemanticConstraint};
use std::collections::BTreeSet;

/// Run the constraint solver over every solver-participating label and a
/// greedy highest-score-first fallback over the rest, respecting block
/// exclusivity across both. The solver runs first so the default
/// (`SolverLabels::All`) path matches `spec.md`'s documented scenarios
/// exactly; greedy-only labels then fill whatever blocks remain.
#[must_use]
pub fn solve_page(
    result: &ClassificationResult,
    config: &SolverConfig,
    declared_semantic_constraints: &[SemanticConstraint],
) -> SolveOutcome {
    solve_page_excluding(result, config, declared_semantic_constraints, &BTreeSet::new())
}

/// Like [`solve_page`], but permanently forbids selecting any candidate in
/// `excluded` — used by the builder's retry loop after a `BuildFailed`.
#[must_use]
pub fn solve_page_excluding(
    result: &ClassificationResult,
    config: &SolverConfig,
    declared_semantic_constraints: &[SemanticConstraint],
    excluded: &BTreeSet<CandidateId>,
) -> SolveOutcome {
    let all_labels: Vec<String> = result
        .all_candidates()
        .map(|c| c.label.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let solver_labels: Vec<&str> = all_labels
        .iter()
        .map(String::as_str)
        .filter(|label| config.use_solver && config.solver_labels.participates(label))
        .collect();

    let mut solver_vars = Vec::new();
    for label in &solver_labels {
        for candidate in result.get_scored_candidates(label) {
            solver_vars.push(ModelVar {
                id: candidate.id,
                score: candidate.score,
                source_blocks: candidate.source_blocks.clone(),
            });
        }
    }

    let mut constraints: Vec<Constraint> = Vec::new();
    constraints.extend(structural_constraints(result));
    constraints.extend(block_exclusivity_constraints(result));
    constraints.extend(semantic_constraints(result, declared_semantic_constraints));
    constraints.extend(excluded.iter().copied().map(Constraint::Forbidden));
    // Drop constraints that reference a candidate the solver isn't modeling
    // (a greedy-fallback label); those relationships are enforced by the
    // greedy pass's own block-exclusivity check instead.
    let solver_ids: BTreeSet<CandidateId> = solver_vars.iter().map(|v| v.id).collect();
    constraints.retain(|c| constraint_ids(c).iter().all(|id| solver_ids.contains(id)));

    let outcome = if solver_vars.is_empty() {
        SolveOutcome {
            feasible: true,
            ..SolveOutcome::default()
        }
    } else {
        let model = ConstraintModel::new(solver_vars, constraints, config.unconsumed_penalty);
        model.solve(config.per_page_timeout)
    };

    let mut consumed_blocks: BTreeSet<BlockId> = outcome
        .selected
        .iter()
        .filter_map(|id| result.candidate(*id))
        .flat_map(|c| c.source_blocks.iter().copied())
        .collect();

    let mut selected = outcome.selected.clone();
    let greedy_labels: Vec<&str> = all_labels
        .iter()
        .map(String::as_str)
        .filter(|label| !config.use_solver || !config.solver_labels.participates(label))
        .collect();
    for label in greedy_labels {
        let mut candidates = result.get_scored_candidates(label);
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        for candidate in candidates {
            if excluded.contains(&candidate.id) {
                continue;
            }
            if candidate.source_blocks.is_disjoint(&consumed_blocks) {
                selected.insert(candidate.id);
                consumed_blocks.extend(candidate.source_blocks.iter().copied());
            }
        }
    }

    SolveOutcome {
        feasible: outcome.feasible,
        selected,
        timed_out: outcome.timed_out,
        nodes_explored: outcome.nodes_explored,
    }
}

fn constraint_ids(constraint: &Constraint) -> Vec<CandidateId> {
    match constraint {
        Constraint::AtMostOneOf(ids) | Constraint::ExactlyOneOf(ids) => ids.clone(),
        Constraint::IfSelectedThen { parent, children, .. } => {
            let mut ids = vec![*parent];
            ids.extend(children);
            ids
        }
        Constraint::IfAnySelectedThenOneOf { group, parents } => {
            let mut ids = group.clone();
            ids.extend(parents);
            ids
        }
        Constraint::MutuallyExclusive(a, b) => vec![*a, *b],
        Constraint::BlockExclusivity { candidates, .. } => candidates.clone(),
        Constraint::Forbidden(id) => vec![*id],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfigBuilder;
    use lego_core::candidate::{Candidate, HasElementKind};
    use lego_core::{ElementKind, ScoreDetails};

    struct PartCountMarker;
    impl HasElementKind for PartCountMarker {
        const KIND: ElementKind = ElementKind::PartCount;
    }

    #[test]
    fn solver_picks_higher_score_under_block_conflict() {
        let mut result = ClassificationResult::new(1);
        let a = result.next_candidate_id();
        result.add(Candidate::<PartCountMarker>::new_atomic(
            a,
            "part_count",
            0.8,
            ScoreDetails::ParsedText {
                raw_text: "4x".to_string(),
            },
            1,
        ));
        let b = result.next_candidate_id();
        result.add(Candidate::<PartCountMarker>::new_atomic(
            b,
            "bag_number",
            0.7,
            ScoreDetails::ParsedText {
                raw_text: "4".to_string(),
            },
            1,
        ));

        let config = SolverConfigBuilder::new(1.0)
            .build(&["part_count", "bag_number"])
            .unwrap();
        let outcome = solve_page(&result, &config, &[]);
        assert!(outcome.feasible);
        assert!(outcome.selected.contains(&a));
        assert!(!outcome.selected.contains(&b));
    }
}
