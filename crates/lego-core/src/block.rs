//! The block model: the flat, typed layout primitives the PDF extractor hands the
//! classification core, and the immutable per-page container that holds them.

use crate::error::{LegoError, Result};
use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// A stable identifier for a block, unique within its page.
pub type BlockId = u64;

/// One layout primitive extracted from a page.
///
/// `Drawing.original_bbox` is distinct from `bbox` because the extractor may clip a
/// drawing's path to the page's content stream bounds; classifiers that reason about
/// a drawing's true extent (e.g. a parts-list container) should prefer
/// `original_bbox` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Text {
        id: BlockId,
        bbox: BBox,
        text: String,
        font_size: f64,
        font_name: String,
    },
    Image {
        id: BlockId,
        bbox: BBox,
        image_id: String,
    },
    Drawing {
        id: BlockId,
        bbox: BBox,
        original_bbox: Option<BBox>,
        paths: Option<Vec<(f64, f64)>>,
        fill_color: Option<(u8, u8, u8)>,
        stroke_color: Option<(u8, u8, u8)>,
        thickness: Option<f64>,
    },
}

impl Block {
    #[must_use]
    pub fn id(&self) -> BlockId {
        match self {
            Self::Text { id, .. } | Self::Image { id, .. } | Self::Drawing { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn bbox(&self) -> &BBox {
        match self {
            Self::Text { bbox, .. } | Self::Image { bbox, .. } | Self::Drawing { bbox, .. } => {
                bbox
            }
        }
    }

    /// The bbox classifiers should reason about for containment: a drawing's
    /// `original_bbox` if present, otherwise the (possibly clipped) `bbox`.
    #[must_use]
    pub fn effective_bbox(&self) -> &BBox {
        match self {
            Self::Drawing {
                bbox,
                original_bbox,
                ..
            } => original_bbox.as_ref().unwrap_or(bbox),
            other => other.bbox(),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<(&str, f64, &str)> {
        match self {
            Self::Text {
                text,
                font_size,
                font_name,
                ..
            } => Some((text.as_str(), *font_size, font_name.as_str())),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    /// Check the `x0 <= x1`, `y0 <= y1` invariant on this block's bbox (and, for a
    /// `Drawing`, its `original_bbox` too). `Block` derives `Deserialize` directly
    /// over public fields, so a block arriving from untrusted JSON can carry an
    /// inverted rectangle that never passed through `BBox::new`/`try_new` — this is
    /// the check `PageData::try_new` runs per block before accepting it
    /// (`spec.md` §7: "the offending block is dropped with a warning").
    pub fn validate(&self) -> Result<()> {
        if !self.bbox().is_valid() {
            let b = self.bbox();
            return Err(LegoError::InvalidBBox {
                block_id: self.id(),
                reason: format!(
                    "rectangle ({}, {}, {}, {}) has x0 > x1 or y0 > y1",
                    b.x0, b.y0, b.x1, b.y1
                ),
            });
        }
        if let Self::Drawing {
            original_bbox: Some(ob),
            ..
        } = self
        {
            if !ob.is_valid() {
                return Err(LegoError::InvalidBBox {
                    block_id: self.id(),
                    reason: format!(
                        "original_bbox ({}, {}, {}, {}) has x0 > x1 or y0 > y1",
                        ob.x0, ob.y0, ob.x1, ob.y1
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The extracted blocks for a single page, frozen after extraction.
///
/// `page_index` is 1-based, matching the convention the printed instruction booklet
/// itself uses (page 1 is the first page a reader sees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    page_index: u32,
    page_width: f64,
    page_height: f64,
    blocks: Vec<Block>,
}

impl PageData {
    /// Build page data directly from already-trusted blocks, with no
    /// validation. Use this only for literal, known-good blocks (tests,
    /// fixtures); data coming from the extractor should go through
    /// [`PageData::try_new`] instead.
    #[must_use]
    pub fn new(page_index: u32, page_width: f64, page_height: f64, blocks: Vec<Block>) -> Self {
        Self {
            page_index,
            page_width,
            page_height,
            blocks,
        }
    }

    /// Build page data from raw extractor output, dropping any block whose
    /// bbox violates `x0 <= x1`/`y0 <= y1` (`spec.md` §7: "the offending
    /// block is dropped with a warning"). Returns the sanitized page
    /// alongside one [`LegoError::InvalidBBox`] per dropped block, so the
    /// caller can log/record a warning for each.
    #[must_use]
    pub fn try_new(
        page_index: u32,
        page_width: f64,
        page_height: f64,
        blocks: Vec<Block>,
    ) -> (Self, Vec<LegoError>) {
        let mut kept = Vec::with_capacity(blocks.len());
        let mut dropped = Vec::new();
        for block in blocks {
            match block.validate() {
                Ok(()) => kept.push(block),
                Err(err) => dropped.push(err),
            }
        }
        (Self::new(page_index, page_width, page_height, kept), dropped)
    }

    #[inline]
    #[must_use]
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    #[inline]
    #[must_use]
    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    #[inline]
    #[must_use]
    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    #[must_use]
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(Block::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_block(id: BlockId, bbox: BBox, text: &str) -> Block {
        Block::Text {
            id,
            bbox,
            text: text.to_string(),
            font_size: 10.0,
            font_name: "Helvetica".to_string(),
        }
    }

    #[test]
    fn page_data_looks_up_blocks_by_id() {
        let page = PageData::new(
            1,
            600.0,
            840.0,
            vec![text_block(0, BBox::new(10.0, 820.0, 25.0, 835.0), "5")],
        );
        assert_eq!(page.block(0).unwrap().as_text().unwrap().0, "5");
        assert!(page.block(99).is_none());
    }

    #[test]
    fn drawing_effective_bbox_prefers_original() {
        let clipped = BBox::new(0.0, 0.0, 50.0, 50.0);
        let original = BBox::new(0.0, 0.0, 100.0, 100.0);
        let drawing = Block::Drawing {
            id: 1,
            bbox: clipped,
            original_bbox: Some(original),
            paths: None,
            fill_color: None,
            stroke_color: None,
            thickness: None,
        };
        assert_eq!(*drawing.effective_bbox(), original);
    }

    #[test]
    fn validate_rejects_a_block_whose_bbox_bypassed_the_constructors() {
        let block = text_block(
            0,
            BBox {
                x0: 10.0,
                y0: 0.0,
                x1: 0.0,
                y1: 10.0,
            },
            "5",
        );
        let err = block.validate().unwrap_err();
        match err {
            LegoError::InvalidBBox { block_id, .. } => assert_eq!(block_id, 0),
            other => panic!("expected InvalidBBox, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_an_invalid_original_bbox_on_a_drawing() {
        let drawing = Block::Drawing {
            id: 3,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            original_bbox: Some(BBox {
                x0: 5.0,
                y0: 0.0,
                x1: 0.0,
                y1: 10.0,
            }),
            paths: None,
            fill_color: None,
            stroke_color: None,
            thickness: None,
        };
        assert!(drawing.validate().is_err());
    }

    #[test]
    fn try_new_drops_invalid_blocks_and_reports_one_error_each() {
        let good = text_block(0, BBox::new(10.0, 820.0, 25.0, 835.0), "5");
        let bad = text_block(
            1,
            BBox {
                x0: 10.0,
                y0: 0.0,
                x1: 0.0,
                y1: 10.0,
            },
            "bad",
        );
        let (page, dropped) = PageData::try_new(1, 600.0, 840.0, vec![good, bad]);
        assert_eq!(page.blocks().len(), 1);
        assert_eq!(page.block(0).unwrap().as_text().unwrap().0, "5");
        assert!(page.block(1).is_none());
        assert_eq!(dropped.len(), 1);
        match &dropped[0] {
            LegoError::InvalidBBox { block_id, .. } => assert_eq!(*block_id, 1),
            other => panic!("expected InvalidBBox, got {other:?}"),
        }
    }
}
