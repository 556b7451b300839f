//! Full-stack solve: schema-generated structural constraints, block
//! exclusivity, and the branch-and-bound engine wired together through
//! `solve_page`/`solve_page_excluding`, the same entry points
//! `lego-classify`'s pipeline calls once per page.

use lego_core::candidate::{Candidate, CandidateRef, HasElementKind};
use lego_core::{ClassificationResult, ElementKind};
use lego_core::ScoreDetails;
use lego_solver::{solve_page, solve_page_excluding, SolverConfigBuilder};
use std::collections::BTreeSet;

struct PartCountMarker;
impl HasElementKind for PartCountMarker {
    const KIND: ElementKind = ElementKind::PartCount;
}
struct BagNumberMarker;
impl HasElementKind for BagNumberMarker {
    const KIND: ElementKind = ElementKind::BagNumber;
}
struct PartImageMarker;
impl HasElementKind for PartImageMarker {
    const KIND: ElementKind = ElementKind::PartImage;
}
struct PartMarker;
impl HasElementKind for PartMarker {
    const KIND: ElementKind = ElementKind::Part;
}
struct PartsListMarker;
impl HasElementKind for PartsListMarker {
    const KIND: ElementKind = ElementKind::PartsList;
}

/// Builds `PartCount`(block 0) + `BagNumber`(block 0, competing for the same
/// block) + `PartImage`(block 1), a `Part` composite over the first and
/// third, and a `PartsList` composite over the `Part` — mirroring the
/// structural chain `lego-classify`'s `PartsClassifier`/`PartsListClassifier`
/// emit, but built by hand so the test owns every score.
fn hierarchy() -> (ClassificationResult, [u64; 5]) {
    let mut result = ClassificationResult::new(1);

    let count_id = result.next_candidate_id();
    result.add(Candidate::<PartCountMarker>::new_atomic(
        count_id,
        "part_count",
        0.6,
        ScoreDetails::ParsedText {
            raw_text: "4x".to_string(),
        },
        0,
    ));

    let bag_id = result.next_candidate_id();
    result.add(Candidate::<BagNumberMarker>::new_atomic(
        bag_id,
        "bag_number",
        0.9,
        ScoreDetails::ParsedText {
            raw_text: "4".to_string(),
        },
        0,
    ));

    let image_id = result.next_candidate_id();
    result.add(Candidate::<PartImageMarker>::new_atomic(
        image_id,
        "part_image",
        0.7,
        ScoreDetails::ParsedImage {
            image_id: "img-1".to_string(),
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

    let parts_list_id = result.next_candidate_id();
    result.add(Candidate::<PartsListMarker>::new_composite(
        parts_list_id,
        "parts_list",
        0.8,
        ScoreDetails::PartsList {
            parts: vec![CandidateRef::new("part", part_id)],
        },
    ));

    (result, [count_id, bag_id, image_id, part_id, parts_list_id])
}

/// Selecting the whole `PartsList -> Part -> (PartCount, PartImage)` chain
/// outscores taking the single higher-scoring `BagNumber` candidate alone,
/// even though `BagNumber` beats `PartCount` head-to-head — the solver has
/// to look past the immediate block conflict to the structure above it.
#[test]
fn structural_chain_outweighs_a_locally_stronger_competitor() {
    let (result, [count_id, bag_id, image_id, part_id, parts_list_id]) = hierarchy();
    let config = SolverConfigBuilder::new(0.5)
        .build(&["part_count", "bag_number", "part_image", "part", "parts_list"])
        .unwrap();

    let outcome = solve_page(&result, &config, &[]);
    assert!(outcome.feasible);
    assert!(outcome.selected.contains(&count_id));
    assert!(outcome.selected.contains(&image_id));
    assert!(outcome.selected.contains(&part_id));
    assert!(outcome.selected.contains(&parts_list_id));
    assert!(!outcome.selected.contains(&bag_id));
}

/// After a build failure excludes the `Part` composite, re-solving should
/// no longer select any member of the chain, freeing block 0 for the
/// `BagNumber` candidate instead — the same rollback-and-reselect path
/// `ClassifierPipeline::classify_page`'s retry loop drives.
#[test]
fn excluding_the_composite_frees_its_block_for_the_competitor() {
    let (result, [count_id, bag_id, image_id, part_id, parts_list_id]) = hierarchy();
    let config = SolverConfigBuilder::new(0.5)
        .build(&["part_count", "bag_number", "part_image", "part", "parts_list"])
        .unwrap();

    let mut excluded = BTreeSet::new();
    excluded.insert(part_id);
    let outcome = solve_page_excluding(&result, &config, &[], &excluded);

    assert!(outcome.feasible);
    assert!(!outcome.selected.contains(&part_id));
    assert!(!outcome.selected.contains(&parts_list_id));
    assert!(!outcome.selected.contains(&count_id));
    assert!(outcome.selected.contains(&bag_id));
    // the image's block has nothing else competing for it, so it still wins
    // on its own merit even with the Part composite forbidden
    assert!(outcome.selected.contains(&image_id));
}
