//! Document-level hint aggregation.
//!
//! `DocumentHints` is computed once per document from every page's blocks, then
//! handed to classifiers read-only. It is the only state shared across pages in the
//! core, and it is immutable after construction (see `spec.md` §5 and §9).

use crate::block::{Block, PageData};
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A histogram over observed font sizes, rounded to one decimal point so that
/// sub-pixel rendering differences don't fragment an otherwise-uniform size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontHistogram {
    counts: FxHashMap<OrderedFloat<f64>, u32>,
}

impl FontHistogram {
    fn bucket(size: f64) -> OrderedFloat<f64> {
        OrderedFloat((size * 10.0).round() / 10.0)
    }

    fn observe(&mut self, size: f64) {
        *self.counts.entry(Self::bucket(size)).or_insert(0) += 1;
    }

    #[must_use]
    pub fn count(&self, size: f64) -> u32 {
        self.counts.get(&Self::bucket(size)).copied().unwrap_or(0)
    }

    /// The most frequently observed size among all observations, or `None` if the
    /// histogram is empty.
    #[must_use]
    pub fn dominant_size(&self) -> Option<f64> {
        self.counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(size, _)| size.into_inner())
    }

    /// The most frequently observed size among the subset of observations passing
    /// `predicate`, evaluated over the original `(block_text, font_size)` pairs this
    /// histogram was built from is not retained — callers instead build a scoped
    /// sub-histogram with [`FontHistogram::from_sizes`] over a pre-filtered set.
    #[must_use]
    pub fn from_sizes(sizes: impl IntoIterator<Item = f64>) -> Self {
        let mut hist = Self::default();
        for s in sizes {
            hist.observe(s);
        }
        hist
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Read-only, document-level statistics made available to every classifier.
///
/// Built once per document via [`DocumentHints::build`] and shared by reference
/// (typically behind an `Arc`) across every page's classification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentHints {
    /// Histogram over every text block's font size, across all pages.
    pub font_sizes: FontHistogram,
    /// Modal font size among text that looks like a page number (small integer,
    /// positioned near a bottom corner).
    pub page_number_size: Option<f64>,
    /// Modal font size among small integers that are *not* plausible page numbers —
    /// the dominant such size is the step-number size.
    pub step_number_size: Option<f64>,
    /// Modal font size among `NxX`/`N×` style part-count text.
    pub part_count_size: Option<f64>,
    /// Modal font size among bare 4-7 digit part-number text.
    pub part_number_size: Option<f64>,
    /// Page indices (1-based) whose text/layout statistics look like a parts-list
    /// catalogue page (dense grid of small count texts) rather than a build step.
    pub parts_catalogue_pages: Vec<u32>,
}

const PAGE_NUMBER_BAND_FRACTION: f64 = 0.08;

impl DocumentHints {
    /// Aggregate hints from every page of one document.
    #[must_use]
    pub fn build(pages: &[PageData]) -> Self {
        let mut all_sizes = Vec::new();
        let mut page_number_sizes = Vec::new();
        let mut step_number_sizes = Vec::new();
        let mut part_count_sizes = Vec::new();
        let mut part_number_sizes = Vec::new();
        let mut parts_catalogue_pages = Vec::new();

        for page in pages {
            let mut small_integer_count = 0usize;
            let mut part_count_like = 0usize;

            for block in page.blocks() {
                let Some((text, font_size, _)) = block.as_text() else {
                    continue;
                };
                let trimmed = text.trim();
                all_sizes.push(font_size);

                if is_small_integer(trimmed) {
                    small_integer_count += 1;
                    if looks_like_page_number(block, page) {
                        page_number_sizes.push(font_size);
                    } else {
                        step_number_sizes.push(font_size);
                    }
                } else if is_part_count_pattern(trimmed) {
                    part_count_like += 1;
                    part_count_sizes.push(font_size);
                } else if is_part_number_pattern(trimmed) {
                    part_number_sizes.push(font_size);
                }
            }

            let text_block_count = page.blocks().iter().filter(|b| b.is_text()).count();
            if text_block_count > 0
                && part_count_like * 3 >= text_block_count
                && part_count_like >= 2
            {
                parts_catalogue_pages.push(page.page_index());
            }
        }

        Self {
            font_sizes: FontHistogram::from_sizes(all_sizes),
            page_number_size: FontHistogram::from_sizes(page_number_sizes).dominant_size(),
            step_number_size: FontHistogram::from_sizes(step_number_sizes).dominant_size(),
            part_count_size: FontHistogram::from_sizes(part_count_sizes).dominant_size(),
            part_number_size: FontHistogram::from_sizes(part_number_sizes).dominant_size(),
            parts_catalogue_pages,
        }
    }

    #[must_use]
    pub fn is_parts_catalogue_page(&self, page_index: u32) -> bool {
        self.parts_catalogue_pages.contains(&page_index)
    }
}

fn is_small_integer(text: &str) -> bool {
    !text.is_empty() && text.len() <= 3 && text.chars().all(|c| c.is_ascii_digit())
}

fn is_part_count_pattern(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    let stripped = lower.trim_end_matches(['x', '×']);
    stripped != lower
        && !stripped.is_empty()
        && stripped.len() <= 3
        && stripped.chars().all(|c| c.is_ascii_digit())
}

fn is_part_number_pattern(text: &str) -> bool {
    text.len() >= 4 && text.len() <= 8 && text.chars().all(|c| c.is_ascii_digit())
}

/// Heuristic: a small integer sits in the bottom band of the page and near a
/// horizontal edge, the classic position for a printed page number.
fn looks_like_page_number(block: &Block, page: &PageData) -> bool {
    let bbox = block.bbox();
    let bottom_band_start = page.page_height() * (1.0 - PAGE_NUMBER_BAND_FRACTION);
    let near_left = bbox.x0 <= page.page_width() * 0.15;
    let near_right = bbox.x1 >= page.page_width() * 0.85;
    bbox.y1 >= bottom_band_start && (near_left || near_right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn text(id: u64, bbox: BBox, text: &str, font_size: f64) -> Block {
        Block::Text {
            id,
            bbox,
            text: text.to_string(),
            font_size,
            font_name: "Helvetica".to_string(),
        }
    }

    #[test]
    fn distinguishes_page_number_from_step_number_by_position() {
        let page = PageData::new(
            3,
            600.0,
            840.0,
            vec![
                // bottom-right corner: page number
                text(0, BBox::new(560.0, 810.0, 580.0, 825.0), "3", 9.0),
                // middle of page, larger font: step number
                text(1, BBox::new(40.0, 400.0, 70.0, 430.0), "2", 18.0),
            ],
        );

        let hints = DocumentHints::build(std::slice::from_ref(&page));
        assert_eq!(hints.page_number_size, Some(9.0));
        assert_eq!(hints.step_number_size, Some(18.0));
    }

    #[test]
    fn detects_parts_catalogue_page() {
        let mut blocks = Vec::new();
        for i in 0..6u64 {
            blocks.push(text(
                i,
                BBox::new(10.0 + i as f64 * 50.0, 10.0, 40.0 + i as f64 * 50.0, 30.0),
                "2x",
                8.0,
            ));
        }
        let page = PageData::new(1, 600.0, 840.0, blocks);
        let hints = DocumentHints::build(&[page]);
        assert!(hints.is_parts_catalogue_page(1));
    }
}
