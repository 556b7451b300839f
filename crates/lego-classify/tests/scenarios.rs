//! End-to-end scenarios through the real `ClassifierPipeline`: every
//! classifier registered, `DocumentHints` built from the page under test,
//! and a tuned `SolverConfig` driving selection.

use lego_core::{BBox, Block, DocumentHints, LegoPageElement, PageData};
use lego_classify::{all_classifiers, ClassifierPipeline};
use lego_solver::SolverConfigBuilder;

fn build_pipeline() -> ClassifierPipeline {
    ClassifierPipeline::new(all_classifiers()).expect("registered classifiers form a valid pipeline")
}

fn config_for(pipeline_labels: &[&str]) -> lego_solver::SolverConfig {
    SolverConfigBuilder::default_all(0.5)
        .build(pipeline_labels)
        .expect("valid solver config")
}

fn declared_labels() -> Vec<String> {
    all_classifiers().iter().map(|c| c.output().to_string()).collect()
}

fn text(id: u64, bbox: BBox, text: &str, font_size: f64) -> Block {
    Block::Text {
        id,
        bbox,
        text: text.to_string(),
        font_size,
        font_name: "Helvetica".to_string(),
    }
}

fn image(id: u64, bbox: BBox, image_id: &str) -> Block {
    Block::Image {
        id,
        bbox,
        image_id: image_id.to_string(),
    }
}

fn drawing(id: u64, bbox: BBox) -> Block {
    Block::Drawing {
        id,
        bbox,
        original_bbox: None,
        paths: None,
        fill_color: None,
        stroke_color: None,
        thickness: None,
    }
}

/// S1: a small integer sitting in the bottom margin is recognized as the
/// page number and its source block is consumed.
#[test]
fn page_number_is_recognized_in_the_bottom_margin() {
    let page = PageData::new(
        1,
        600.0,
        840.0,
        vec![text(0, BBox::new(560.0, 810.0, 580.0, 825.0), "7", 9.0)],
    );
    let hints = DocumentHints::build(std::slice::from_ref(&page));
    let labels = declared_labels();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let config = config_for(&label_refs);

    let pipeline = build_pipeline();
    let (element, report) = pipeline.classify_page(&page, &hints, &config);

    let LegoPageElement::Page(page_elem) = element else {
        panic!("expected Page");
    };
    let page_number = page_elem.page_number.expect("page number should be selected");
    let LegoPageElement::PageNumber(number) = *page_number else {
        panic!("expected PageNumber");
    };
    assert_eq!(number.value, 7);
    assert!(report.consumed_blocks.contains(&0));
}

/// S2: two candidates for the same step-number value must not both be
/// selected — the solver's `UniqueBy` constraint keeps at most one.
#[test]
fn step_number_uniqueness_keeps_only_one_candidate_per_value() {
    let page = PageData::new(
        1,
        600.0,
        840.0,
        vec![
            text(0, BBox::new(40.0, 400.0, 70.0, 430.0), "2", 18.0),
            text(1, BBox::new(300.0, 400.0, 320.0, 415.0), "2", 8.0),
        ],
    );
    let hints = DocumentHints {
        step_number_size: Some(18.0),
        ..DocumentHints::default()
    };
    let labels = declared_labels();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let config = config_for(&label_refs);

    let pipeline = build_pipeline();
    let (_, report) = pipeline.classify_page(&page, &hints, &config);

    let selected_step_numbers: Vec<_> = report
        .candidates
        .iter()
        .filter(|c| c.label == "step_number" && c.selected)
        .collect();
    assert_eq!(selected_step_numbers.len(), 1);
}

/// S3: a vector `Drawing` containing two count+image pairs is grouped into
/// a `PartsList` of two `Part`s. The container `Drawing` itself is never a
/// child of the composite (`PartsList` carries `source_blocks = empty`, see
/// `DESIGN.md`), so it is left in `unprocessed_blocks` even though the page
/// was otherwise fully and correctly classified.
#[test]
fn parts_list_groups_two_parts_and_leaves_its_container_unprocessed() {
    // Container area (2,000) sits above `PartsListClassifier`'s 1,500 floor
    // but below `DiagramClassifier`'s 2,500 floor, so nothing but `PartsList`
    // claims it as a container.
    let container = BBox::new(0.0, 0.0, 100.0, 20.0);
    let page = PageData::new(
        1,
        600.0,
        840.0,
        vec![
            drawing(9, container),
            image(10, BBox::new(5.0, 0.0, 25.0, 10.0), "img-a"),
            text(11, BBox::new(10.0, 11.0, 22.0, 18.0), "4x", 8.0),
            image(12, BBox::new(60.0, 0.0, 80.0, 10.0), "img-b"),
            text(13, BBox::new(65.0, 11.0, 77.0, 18.0), "3x", 8.0),
        ],
    );
    let hints = DocumentHints::build(std::slice::from_ref(&page));
    let labels = declared_labels();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let config = config_for(&label_refs);

    let pipeline = build_pipeline();
    let (_, report) = pipeline.classify_page(&page, &hints, &config);

    let selected_parts_lists: Vec<_> = report
        .candidates
        .iter()
        .filter(|c| c.label == "parts_list" && c.selected)
        .collect();
    assert_eq!(selected_parts_lists.len(), 1);
    let selected_parts: Vec<_> = report
        .candidates
        .iter()
        .filter(|c| c.label == "part" && c.selected)
        .collect();
    assert_eq!(selected_parts.len(), 2);

    for block in [10u64, 11, 12, 13] {
        assert!(report.consumed_blocks.contains(&block), "block {block} should be consumed");
    }
    assert!(
        report.unprocessed_blocks.contains(&9),
        "the parts-list container itself is never a source block of any candidate"
    );
}

/// S5: an `Arrow` with no `Step` anywhere on the page is scored but never
/// selected — `ArrowClassifier`'s `NoOrphans` constraint against `step`.
#[test]
fn arrow_without_any_step_is_never_selected() {
    let page = PageData::new(
        1,
        600.0,
        840.0,
        vec![drawing(0, BBox::new(100.0, 100.0, 140.0, 108.0))],
    );
    let hints = DocumentHints::default();
    let labels = declared_labels();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let config = config_for(&label_refs);

    let pipeline = build_pipeline();
    let (_, report) = pipeline.classify_page(&page, &hints, &config);

    let arrow_candidates: Vec<_> = report.candidates.iter().filter(|c| c.label == "arrow").collect();
    assert!(!arrow_candidates.is_empty(), "the geometry should still score as a candidate");
    assert!(arrow_candidates.iter().all(|c| !c.selected));
}

/// Classifying the same page twice with the same hints and config produces
/// an identical report (`spec.md` §8 P1, determinism).
#[test]
fn classification_is_deterministic_across_runs() {
    let page = PageData::new(
        1,
        600.0,
        840.0,
        vec![
            text(0, BBox::new(560.0, 810.0, 580.0, 825.0), "12", 9.0),
            text(1, BBox::new(40.0, 400.0, 70.0, 430.0), "2", 18.0),
        ],
    );
    let hints = DocumentHints::build(std::slice::from_ref(&page));
    let labels = declared_labels();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let config = config_for(&label_refs);

    let pipeline = build_pipeline();
    let (_, report_a) = pipeline.classify_page(&page, &hints, &config);
    let (_, report_b) = pipeline.classify_page(&page, &hints, &config);
    assert_eq!(report_a, report_b);
}

/// `spec.md` §7: a block with an invalid bbox (as could arrive through
/// `Deserialize`, which builds a `BBox` directly over public fields with no
/// validation) is dropped before any classifier sees it, and the page carries
/// a warning instead of failing outright.
#[test]
fn a_block_with_an_inverted_bbox_is_dropped_with_a_warning() {
    let good = text(0, BBox::new(560.0, 810.0, 580.0, 825.0), "12", 9.0);
    let invalid_bbox = BBox {
        x0: 100.0,
        y0: 0.0,
        x1: 50.0,
        y1: 10.0,
    };
    let bad = Block::Text {
        id: 1,
        bbox: invalid_bbox,
        text: "oops".to_string(),
        font_size: 9.0,
        font_name: "Helvetica".to_string(),
    };
    let page = PageData::new(1, 600.0, 840.0, vec![good, bad]);
    let hints = DocumentHints::default();
    let labels = declared_labels();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let config = config_for(&label_refs);

    let pipeline = build_pipeline();
    let (_, report) = pipeline.classify_page(&page, &hints, &config);

    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("block 1 has an invalid bounding box")),
        "expected a warning naming the dropped block, got {:?}",
        report.warnings
    );
}
