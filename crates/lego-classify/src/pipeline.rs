//! The pipeline driver: validates the registered classifier set, runs score
//! → solve → build → spatial-assignment per page, and retries around build
//! failures (`spec.md` §4.1, §4.4, §5).
//!
//! Grounded on `docling-pdf-ml::pipeline_modular::orchestrator::ModularPipeline`,
//! generalized from a fixed stage04..stage10 sequence to an arbitrary
//! dependency-ordered classifier set with topological sort and cycle
//! detection, since the LEGO classifiers' `requires` graph isn't known until
//! the caller registers them.

use crate::classifier::Classifier;
use crate::spatial;
use lego_core::{
    BlockId, CandidateId, ClassificationReport, ClassificationResult, DocumentHints, LegoError,
    LegoPageElement, PageData, Result, SemanticConstraint,
};
use lego_solver::{solve_page_excluding, SolverConfig};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// A validated, dependency-ordered set of classifiers ready to run pages
/// through.
pub struct ClassifierPipeline {
    classifiers: Vec<Box<dyn Classifier>>,
    /// Indices into `classifiers`, in topological (dependency-respecting,
    /// alphabetically tie-broken) order.
    topo_order: Vec<usize>,
}

impl ClassifierPipeline {
    /// Validate and build a pipeline: every label must be produced by
    /// exactly one classifier, every `requires` label must be declared, and
    /// the dependency graph must be acyclic (`spec.md` §4.1).
    pub fn new(classifiers: Vec<Box<dyn Classifier>>) -> Result<Self> {
        let mut producer_of: FxHashMap<&'static str, usize> = FxHashMap::default();
        for (index, classifier) in classifiers.iter().enumerate() {
            if producer_of.insert(classifier.output(), index).is_some() {
                return Err(LegoError::ConfigError {
                    reason: format!("duplicate output label '{}'", classifier.output()),
                });
            }
        }
        for classifier in &classifiers {
            for req in classifier.requires() {
                if !producer_of.contains_key(req) {
                    return Err(LegoError::ConfigError {
                        reason: format!(
                            "classifier '{}' requires undeclared label '{req}'",
                            classifier.output()
                        ),
                    });
                }
            }
        }

        let topo_order = topological_sort(&classifiers, &producer_of)?;

        Ok(Self {
            classifiers,
            topo_order,
        })
    }

    /// Run one page through score → solve → build → spatial assignment,
    /// returning the root `Page` element and its classification report.
    pub fn classify_page(
        &self,
        page: &PageData,
        hints: &DocumentHints,
        config: &SolverConfig,
    ) -> (LegoPageElement, ClassificationReport) {
        let mut result = ClassificationResult::new(page.page_index());

        // `page` may not have been built through `PageData::try_new` (e.g. it
        // round-tripped through `Deserialize`, which constructs `BBox`es directly
        // over public fields with no validation) — re-check here so an invalid
        // block is always dropped with a warning rather than reaching a
        // classifier (`spec.md` §7).
        let (sanitized, dropped) = PageData::try_new(
            page.page_index(),
            page.page_width(),
            page.page_height(),
            page.blocks().to_vec(),
        );
        for err in dropped {
            log::warn!("page {}: dropping invalid block: {err}", page.page_index());
            result.warn(err.to_string());
        }
        let page = &sanitized;

        for &index in &self.topo_order {
            let classifier = &self.classifiers[index];
            classifier.score(page, hints, &mut result);
            log::debug!(
                "page {}: classifier '{}' emitted {} candidates",
                page.page_index(),
                classifier.output(),
                result.get_scored_candidates(classifier.output()).len()
            );
        }

        let declared_constraints: Vec<SemanticConstraint> = self
            .classifiers
            .iter()
            .flat_map(|c| c.declare_constraints(&result))
            .collect();

        let mut excluded: BTreeSet<CandidateId> = BTreeSet::new();
        let mut attempt = 0u32;
        loop {
            result.checkpoint();
            let outcome = solve_page_excluding(&result, config, &declared_constraints, &excluded);
            if !outcome.feasible {
                log::warn!("page {}: solver found no feasible selection", page.page_index());
                result.warn(format!(
                    "solver infeasible for page {}",
                    page.page_index()
                ));
                result.rollback("solver infeasible");
                break;
            }
            if outcome.timed_out {
                log::warn!(
                    "page {}: solver timed out after exploring {} nodes, using best effort",
                    page.page_index(),
                    outcome.nodes_explored
                );
                result.warn(format!(
                    "solver exceeded its time budget for page {}",
                    page.page_index()
                ));
            }

            for id in &outcome.selected {
                result.select(*id);
            }

            let mut failed: Option<CandidateId> = None;
            for &index in &self.topo_order {
                let classifier = &self.classifiers[index];
                let ids: Vec<CandidateId> = outcome
                    .selected
                    .iter()
                    .copied()
                    .filter(|id| {
                        result
                            .candidate(*id)
                            .is_some_and(|c| c.label == classifier.output())
                    })
                    .collect();
                for id in ids {
                    match classifier.build(id, page, &mut result) {
                        Ok(element) => {
                            if let Some(candidate) = result.candidate(id) {
                                let blocks: Vec<BlockId> =
                                    candidate.source_blocks.iter().copied().collect();
                                result.consume_blocks(blocks);
                            }
                            result.mark_built(id, element);
                        }
                        Err(err) => {
                            log::warn!(
                                "page {}: build failed for candidate {id} ({}): {err}",
                                page.page_index(),
                                classifier.output()
                            );
                            result.mark_failed(id, err.to_string());
                            failed = Some(id);
                            break;
                        }
                    }
                }
                if failed.is_some() {
                    break;
                }
            }

            match failed {
                Some(id) => {
                    attempt += 1;
                    if attempt > config.build_retry_budget {
                        log::warn!(
                            "page {}: build retry budget exhausted, emitting degraded page",
                            page.page_index()
                        );
                        result.warn("build retry budget exhausted".to_string());
                        result.rollback("build retry budget exhausted");
                        break;
                    }
                    result.rollback(format!("build failed for candidate {id}, excluding and re-solving"));
                    excluded.insert(id);
                }
                None => break,
            }
        }

        let unassigned = spatial::assign_into_steps(&mut result);
        let page_element = assemble_page(page, &result, &unassigned);
        let all_block_ids = page.block_ids();
        let report = ClassificationReport::from_result(&result, &all_block_ids);
        (page_element, report)
    }
}

/// Kahn's algorithm with alphabetical tie-break for determinism
/// (`spec.md` §4.1 "deterministic under ties (alphabetical by label)").
fn topological_sort(
    classifiers: &[Box<dyn Classifier>],
    producer_of: &FxHashMap<&'static str, usize>,
) -> Result<Vec<usize>> {
    let n = classifiers.len();
    let mut in_degree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (index, classifier) in classifiers.iter().enumerate() {
        for req in classifier.requires() {
            let producer = producer_of[req];
            dependents[producer].push(index);
            in_degree[index] += 1;
        }
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while !ready.is_empty() {
        ready.sort_by_key(|&i| classifiers[i].output());
        let next = ready.remove(0);
        order.push(next);
        for &dep in &dependents[next] {
            in_degree[dep] -= 1;
            if in_degree[dep] == 0 {
                ready.push(dep);
            }
        }
    }

    if order.len() != n {
        return Err(LegoError::ConfigError {
            reason: "classifier dependency graph has a cycle".to_string(),
        });
    }
    Ok(order)
}

/// Assemble the root `Page` element from whatever the pipeline built. The
/// `page_number` and `steps` relationships are resolved by looking up the
/// selected `Page`-labeled candidate if one exists; pages with no `Page`
/// composite classifier registered fall back to an empty shell listing
/// unprocessed blocks, so `classify_page` never panics on a minimal
/// classifier set (e.g. in unit tests that register only a handful of
/// classifiers).
fn assemble_page(
    page: &PageData,
    result: &ClassificationResult,
    unassigned: &spatial::UnassignedSpatial,
) -> LegoPageElement {
    let bbox = lego_core::BBox::new(0.0, 0.0, page.page_width(), page.page_height());
    let page_number = result
        .all_candidates()
        .find(|c| c.label == "page_number" && result.selected_candidate_ids().contains(&c.id))
        .and_then(|c| result.built_element(c.id).cloned())
        .map(Box::new);

    let steps: Vec<LegoPageElement> = {
        let mut ids: Vec<CandidateId> = result
            .all_candidates()
            .filter(|c| c.label == "step" && result.selected_candidate_ids().contains(&c.id))
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| result.built_element(id).cloned())
            .collect()
    };

    let background = result
        .all_candidates()
        .find(|c| c.label == "background" && result.selected_candidate_ids().contains(&c.id))
        .and_then(|c| result.built_element(c.id).cloned())
        .map(Box::new);

    let progress_bar = result
        .all_candidates()
        .find(|c| c.label == "progress_bar" && result.selected_candidate_ids().contains(&c.id))
        .and_then(|c| result.built_element(c.id).cloned())
        .map(Box::new);

    let standalone_arrows: Vec<LegoPageElement> = {
        let mut ids = unassigned.arrows.clone();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| result.built_element(id).cloned())
            .collect()
    };

    let standalone_diagrams: Vec<LegoPageElement> = {
        let mut ids = unassigned.diagrams.clone();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| result.built_element(id).cloned())
            .collect()
    };

    let standalone_subassemblies: Vec<LegoPageElement> = {
        let mut ids = unassigned.subassemblies.clone();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| result.built_element(id).cloned())
            .collect()
    };

    let standalone_substeps: Vec<LegoPageElement> = {
        let mut ids = unassigned.substeps.clone();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| result.built_element(id).cloned())
            .collect()
    };

    const DECORATION_LABELS: [&str; 4] =
        ["divider", "shine", "loose_part_symbol", "rotation_symbol"];
    let decorations: Vec<LegoPageElement> = {
        let mut ids: Vec<CandidateId> = result
            .all_candidates()
            .filter(|c| {
                DECORATION_LABELS.contains(&c.label.as_str())
                    && result.selected_candidate_ids().contains(&c.id)
            })
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| result.built_element(id).cloned())
            .collect()
    };

    let unprocessed_blocks: Vec<BlockId> = page
        .block_ids()
        .into_iter()
        .filter(|id| !result.is_consumed(*id))
        .collect();

    LegoPageElement::Page(lego_core::element::PageElem {
        bbox,
        page_number,
        steps,
        background,
        progress_bar,
        standalone_arrows,
        standalone_diagrams,
        standalone_subassemblies,
        standalone_substeps,
        decorations,
        warnings: result.warnings().to_vec(),
        unprocessed_blocks,
    })
}
