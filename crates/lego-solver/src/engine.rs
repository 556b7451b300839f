//! A hand-rolled, CP-SAT-style boolean constraint engine.
//!
//! One decision variable per candidate id. No off-the-shelf CP-SAT binding
//! exists anywhere in this codebase's dependency corpus, so this engine is
//! original, but it follows the teacher's `stage08_overlap_resolver`
//! discipline of choosing a "best" element from a group under constraints —
//! generalized here from "pick one winner per overlap group" to "search a
//! globally feasible, score-maximizing selection subject to arbitrary
//! implication/cardinality/exclusivity constraints."
//!
//! Search is branch-and-bound depth-first over candidates ordered by
//! descending score (so good solutions are found early and pruning is
//! effective), bounded by both a node budget and the caller's wall-clock
//! timeout. It returns the best feasible selection found, which may not be
//! optimal if the timeout is hit first — exactly the "best-effort on
//! timeout" contract in `spec.md` §4.4/§5.

use lego_core::{BlockId, CandidateId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// How many children an `IfSelectedThen` implication requires selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ExactlyOne,
    AtLeast(usize),
}

/// One constraint over candidate decision variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    AtMostOneOf(Vec<CandidateId>),
    ExactlyOneOf(Vec<CandidateId>),
    IfSelectedThen {
        parent: CandidateId,
        children: Vec<CandidateId>,
        cardinality: Cardinality,
    },
    /// If any candidate in `group` is selected, at least one of `parents`
    /// must be selected too (orphan prevention).
    IfAnySelectedThenOneOf {
        group: Vec<CandidateId>,
        parents: Vec<CandidateId>,
    },
    MutuallyExclusive(CandidateId, CandidateId),
    BlockExclusivity {
        block: BlockId,
        candidates: Vec<CandidateId>,
    },
    /// Permanently excludes a candidate from selection — used by the
    /// builder's retry loop to forbid a candidate whose `build` failed
    /// (`spec.md` §4.4 "build retry").
    Forbidden(CandidateId),
}

impl Constraint {
    /// Shorthand for a required single-child reference: `parent` selected
    /// implies `child` selected.
    #[must_use]
    pub fn implies(parent: CandidateId, child: CandidateId) -> Self {
        Self::IfSelectedThen {
            parent,
            children: vec![child],
            cardinality: Cardinality::ExactlyOne,
        }
    }
}

/// A candidate's contribution to the model: its score and the blocks it
/// would consume if selected.
#[derive(Debug, Clone)]
pub struct ModelVar {
    pub id: CandidateId,
    pub score: f64,
    pub source_blocks: BTreeSet<BlockId>,
}

/// A boolean-decision-variable constraint model for one page.
pub struct ConstraintModel {
    vars: Vec<ModelVar>,
    constraints: Vec<Constraint>,
    unconsumed_penalty: f64,
    node_budget: u64,
}

/// Outcome of [`ConstraintModel::solve`].
#[derive(Debug, Clone, Default)]
pub struct SolveOutcome {
    pub feasible: bool,
    pub selected: BTreeSet<CandidateId>,
    pub timed_out: bool,
    pub nodes_explored: u64,
}

const DEFAULT_NODE_BUDGET: u64 = 200_000;

impl ConstraintModel {
    #[must_use]
    pub fn new(vars: Vec<ModelVar>, constraints: Vec<Constraint>, unconsumed_penalty: f64) -> Self {
        Self {
            vars,
            constraints,
            unconsumed_penalty,
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }

    #[must_use]
    pub fn with_node_budget(mut self, node_budget: u64) -> Self {
        self.node_budget = node_budget;
        self
    }

    fn objective(&self, selected: &BTreeSet<CandidateId>) -> f64 {
        let by_id: FxHashMap<CandidateId, &ModelVar> =
            self.vars.iter().map(|v| (v.id, v)).collect();
        let mut score_sum = 0.0;
        let mut consumed: FxHashSet<BlockId> = FxHashSet::default();
        for id in selected {
            if let Some(v) = by_id.get(id) {
                score_sum += v.score;
                consumed.extend(v.source_blocks.iter().copied());
            }
        }
        score_sum + self.unconsumed_penalty * consumed.len() as f64
    }

    fn conflicts(&self, id: CandidateId, selected: &FxHashSet<CandidateId>) -> bool {
        for constraint in &self.constraints {
            match constraint {
                Constraint::Forbidden(forbidden) if *forbidden == id => return true,
                Constraint::AtMostOneOf(group) | Constraint::ExactlyOneOf(group) => {
                    if group.contains(&id) && group.iter().any(|g| *g != id && selected.contains(g))
                    {
                        return true;
                    }
                }
                Constraint::MutuallyExclusive(a, b) => {
                    if (*a == id && selected.contains(b)) || (*b == id && selected.contains(a)) {
                        return true;
                    }
                }
                Constraint::BlockExclusivity { candidates, .. } => {
                    if candidates.contains(&id) {
                        let owning_block = self
                            .vars
                            .iter()
                            .find(|v| v.id == id)
                            .map(|v| v.source_blocks.clone())
                            .unwrap_or_default();
                        for other in candidates {
                            if *other != id
                                && selected.contains(other)
                                && self
                                    .vars
                                    .iter()
                                    .find(|v| v.id == *other)
                                    .is_some_and(|v| !v.source_blocks.is_disjoint(&owning_block))
                            {
                                return true;
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn satisfies_all(&self, selected: &FxHashSet<CandidateId>) -> bool {
        for constraint in &self.constraints {
            match constraint {
                Constraint::Forbidden(id) => {
                    if selected.contains(id) {
                        return false;
                    }
                }
                Constraint::ExactlyOneOf(group) => {
                    if group.iter().filter(|g| selected.contains(g)).count() != 1 {
                        return false;
                    }
                }
                Constraint::AtMostOneOf(group) => {
                    if group.iter().filter(|g| selected.contains(g)).count() > 1 {
                        return false;
                    }
                }
                Constraint::IfSelectedThen {
                    parent,
                    children,
                    cardinality,
                } => {
                    if selected.contains(parent) {
                        let selected_children =
                            children.iter().filter(|c| selected.contains(c)).count();
                        let ok = match cardinality {
                            Cardinality::ExactlyOne => selected_children == children.len(),
                            Cardinality::AtLeast(n) => selected_children >= *n,
                        };
                        if !ok {
                            return false;
                        }
                    }
                }
                Constraint::IfAnySelectedThenOneOf { group, parents } => {
                    if group.iter().any(|g| selected.contains(g))
                        && !parents.iter().any(|p| selected.contains(p))
                    {
                        return false;
                    }
                }
                Constraint::MutuallyExclusive(a, b) => {
                    if selected.contains(a) && selected.contains(b) {
                        return false;
                    }
                }
                Constraint::BlockExclusivity { candidates, .. } => {
                    let mut seen_blocks: FxHashSet<BlockId> = FxHashSet::default();
                    for id in candidates.iter().filter(|c| selected.contains(c)) {
                        if let Some(v) = self.vars.iter().find(|v| v.id == *id) {
                            for b in &v.source_blocks {
                                if !seen_blocks.insert(*b) {
                                    return false;
                                }
                            }
                        }
                    }
                }
            }
        }
        true
    }

    /// Depth-first branch and bound. Returns the best feasible selection
    /// found within the node/time budget.
    pub fn solve(&self, deadline: Duration) -> SolveOutcome {
        let start = Instant::now();
        let mut order: Vec<CandidateId> = self.vars.iter().map(|v| v.id).collect();
        order.sort_by(|a, b| {
            let sa = self.vars.iter().find(|v| v.id == *a).map_or(0.0, |v| v.score);
            let sb = self.vars.iter().find(|v| v.id == *b).map_or(0.0, |v| v.score);
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(b))
        });

        let mut best = SolveOutcome::default();
        let mut best_objective = f64::NEG_INFINITY;
        let mut nodes = 0u64;
        let mut timed_out = false;

        let mut current: FxHashSet<CandidateId> = FxHashSet::default();
        self.search(
            &order,
            0,
            &mut current,
            start,
            deadline,
            &mut nodes,
            &mut timed_out,
            &mut best,
            &mut best_objective,
        );

        best.timed_out = timed_out;
        best.nodes_explored = nodes;
        best
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &self,
        order: &[CandidateId],
        index: usize,
        current: &mut FxHashSet<CandidateId>,
        start: Instant,
        deadline: Duration,
        nodes: &mut u64,
        timed_out: &mut bool,
        best: &mut SolveOutcome,
        best_objective: &mut f64,
    ) {
        if *timed_out || *nodes >= self.node_budget {
            return;
        }
        *nodes += 1;
        if start.elapsed() > deadline {
            *timed_out = true;
            return;
        }

        if index == order.len() {
            if self.satisfies_all(current) {
                let obj = self.objective(current);
                if obj > *best_objective {
                    *best_objective = obj;
                    best.feasible = true;
                    best.selected = current.iter().copied().collect();
                }
            }
            return;
        }

        let id = order[index];

        // Try selecting this candidate first (greedy order favors high score).
        if !self.conflicts(id, current) {
            current.insert(id);
            self.search(
                order,
                index + 1,
                current,
                start,
                deadline,
                nodes,
                timed_out,
                best,
                best_objective,
            );
            current.remove(&id);
            if *timed_out {
                return;
            }
        }

        // Try leaving it unselected.
        self.search(
            order,
            index + 1,
            current,
            start,
            deadline,
            nodes,
            timed_out,
            best,
            best_objective,
        );
    }
}
