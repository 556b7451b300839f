//! The domain element tree: every typed node a classified page can contain.
//!
//! `LegoPageElement` is a tagged union over the element classes named in the
//! specification. Every variant carries its `bbox` and its typed children;
//! cardinalities (exactly-one, at-most-one, sequence) are expressed directly as
//! Rust field types (`Box<LegoPageElement>`, `Option<Box<LegoPageElement>>`,
//! `Vec<LegoPageElement>`) so a malformed tree (e.g. a `Part` missing its
//! `PartCount`) cannot be constructed once the builder phase has run — any
//! optionality that the spec allows is modeled as `Option`, never papered over.
//!
//! [`ElementKind`] is the run-time type tag used by the schema constraint generator
//! (see `spec.md` §9: "attaching a run-time type tag `element_type_id` to each
//! candidate and indexing fields by element-type").

use crate::block::BlockId;
use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// Run-time tag identifying which `LegoPageElement` variant (and which
/// `Candidate<T>` marker) a value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Page,
    PageNumber,
    Step,
    StepNumber,
    SubstepNumber,
    PartsList,
    Part,
    PartCount,
    PartImage,
    PartNumber,
    PieceLength,
    Diagram,
    Arrow,
    RotationSymbol,
    SubAssembly,
    SubStep,
    BagNumber,
    OpenBag,
    ProgressBar,
    ProgressBarIndicator,
    Divider,
    Background,
    LoosePartSymbol,
    Shine,
}

impl ElementKind {
    /// All element kinds, in declaration order — used by the pipeline's
    /// configuration validation and by tests that must enumerate every label.
    pub const ALL: &'static [ElementKind] = &[
        ElementKind::Page,
        ElementKind::PageNumber,
        ElementKind::Step,
        ElementKind::StepNumber,
        ElementKind::SubstepNumber,
        ElementKind::PartsList,
        ElementKind::Part,
        ElementKind::PartCount,
        ElementKind::PartImage,
        ElementKind::PartNumber,
        ElementKind::PieceLength,
        ElementKind::Diagram,
        ElementKind::Arrow,
        ElementKind::RotationSymbol,
        ElementKind::SubAssembly,
        ElementKind::SubStep,
        ElementKind::BagNumber,
        ElementKind::OpenBag,
        ElementKind::ProgressBar,
        ElementKind::ProgressBarIndicator,
        ElementKind::Divider,
        ElementKind::Background,
        ElementKind::LoosePartSymbol,
        ElementKind::Shine,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageElem {
    pub bbox: BBox,
    pub page_number: Option<Box<LegoPageElement>>,
    pub steps: Vec<LegoPageElement>,
    pub background: Option<Box<LegoPageElement>>,
    pub progress_bar: Option<Box<LegoPageElement>>,
    /// Arrows the solver selected but spatial assignment could not place into any
    /// `Step` (see `spec.md` S5).
    pub standalone_arrows: Vec<LegoPageElement>,
    /// Diagrams the solver selected but spatial assignment could not place into
    /// any `Step` (see `spec.md` S6: the losing `Step` keeps `diagram = None`
    /// rather than the `Diagram` vanishing from the page).
    pub standalone_diagrams: Vec<LegoPageElement>,
    /// `SubAssembly` candidates the solver selected but spatial assignment
    /// could not place into any `Step`.
    pub standalone_subassemblies: Vec<LegoPageElement>,
    /// `SubStep` candidates the solver selected but spatial assignment
    /// could not place into any `Step`.
    pub standalone_substeps: Vec<LegoPageElement>,
    /// `Divider`, `Shine`, `LoosePartSymbol`, and `RotationSymbol` candidates:
    /// selected on intrinsic shape alone (`spec.md` §4.2), with no declared
    /// structural parent anywhere in the element tree.
    pub decorations: Vec<LegoPageElement>,
    pub warnings: Vec<String>,
    pub unprocessed_blocks: Vec<BlockId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNumberElem {
    pub bbox: BBox,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepElem {
    pub bbox: BBox,
    pub step_number: Box<LegoPageElement>,
    pub parts_list: Option<Box<LegoPageElement>>,
    pub diagram: Option<Box<LegoPageElement>>,
    pub arrows: Vec<LegoPageElement>,
    pub subassemblies: Vec<LegoPageElement>,
    pub substeps: Vec<LegoPageElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepNumberElem {
    pub bbox: BBox,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstepNumberElem {
    pub bbox: BBox,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsListElem {
    pub bbox: BBox,
    pub parts: Vec<LegoPageElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartElem {
    pub bbox: BBox,
    pub count: Box<LegoPageElement>,
    pub image: Box<LegoPageElement>,
    pub part_number: Option<Box<LegoPageElement>>,
    pub piece_length: Option<Box<LegoPageElement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartCountElem {
    pub bbox: BBox,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartImageElem {
    pub bbox: BBox,
    pub image_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartNumberElem {
    pub bbox: BBox,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceLengthElem {
    pub bbox: BBox,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramElem {
    pub bbox: BBox,
    pub image_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowElem {
    pub bbox: BBox,
    pub direction_degrees: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSymbolElem {
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAssemblyElem {
    pub bbox: BBox,
    pub step_count: Option<u32>,
    pub sub_steps: Vec<LegoPageElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubStepElem {
    pub bbox: BBox,
    pub step_number: Option<Box<LegoPageElement>>,
    pub parts_list: Option<Box<LegoPageElement>>,
    pub diagram: Option<Box<LegoPageElement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagNumberElem {
    pub bbox: BBox,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenBagElem {
    pub bbox: BBox,
    pub bag_number: Option<Box<LegoPageElement>>,
    pub parts: Vec<LegoPageElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressBarElem {
    pub bbox: BBox,
    pub indicators: Vec<LegoPageElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressBarIndicatorElem {
    pub bbox: BBox,
    pub filled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerElem {
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundElem {
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoosePartSymbolElem {
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShineElem {
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LegoPageElement {
    Page(PageElem),
    PageNumber(PageNumberElem),
    Step(StepElem),
    StepNumber(StepNumberElem),
    SubstepNumber(SubstepNumberElem),
    PartsList(PartsListElem),
    Part(PartElem),
    PartCount(PartCountElem),
    PartImage(PartImageElem),
    PartNumber(PartNumberElem),
    PieceLength(PieceLengthElem),
    Diagram(DiagramElem),
    Arrow(ArrowElem),
    RotationSymbol(RotationSymbolElem),
    SubAssembly(SubAssemblyElem),
    SubStep(SubStepElem),
    BagNumber(BagNumberElem),
    OpenBag(OpenBagElem),
    ProgressBar(ProgressBarElem),
    ProgressBarIndicator(ProgressBarIndicatorElem),
    Divider(DividerElem),
    Background(BackgroundElem),
    LoosePartSymbol(LoosePartSymbolElem),
    Shine(ShineElem),
}

impl LegoPageElement {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Page(_) => ElementKind::Page,
            Self::PageNumber(_) => ElementKind::PageNumber,
            Self::Step(_) => ElementKind::Step,
            Self::StepNumber(_) => ElementKind::StepNumber,
            Self::SubstepNumber(_) => ElementKind::SubstepNumber,
            Self::PartsList(_) => ElementKind::PartsList,
            Self::Part(_) => ElementKind::Part,
            Self::PartCount(_) => ElementKind::PartCount,
            Self::PartImage(_) => ElementKind::PartImage,
            Self::PartNumber(_) => ElementKind::PartNumber,
            Self::PieceLength(_) => ElementKind::PieceLength,
            Self::Diagram(_) => ElementKind::Diagram,
            Self::Arrow(_) => ElementKind::Arrow,
            Self::RotationSymbol(_) => ElementKind::RotationSymbol,
            Self::SubAssembly(_) => ElementKind::SubAssembly,
            Self::SubStep(_) => ElementKind::SubStep,
            Self::BagNumber(_) => ElementKind::BagNumber,
            Self::OpenBag(_) => ElementKind::OpenBag,
            Self::ProgressBar(_) => ElementKind::ProgressBar,
            Self::ProgressBarIndicator(_) => ElementKind::ProgressBarIndicator,
            Self::Divider(_) => ElementKind::Divider,
            Self::Background(_) => ElementKind::Background,
            Self::LoosePartSymbol(_) => ElementKind::LoosePartSymbol,
            Self::Shine(_) => ElementKind::Shine,
        }
    }

    #[must_use]
    pub fn bbox(&self) -> &BBox {
        match self {
            Self::Page(e) => &e.bbox,
            Self::PageNumber(e) => &e.bbox,
            Self::Step(e) => &e.bbox,
            Self::StepNumber(e) => &e.bbox,
            Self::SubstepNumber(e) => &e.bbox,
            Self::PartsList(e) => &e.bbox,
            Self::Part(e) => &e.bbox,
            Self::PartCount(e) => &e.bbox,
            Self::PartImage(e) => &e.bbox,
            Self::PartNumber(e) => &e.bbox,
            Self::PieceLength(e) => &e.bbox,
            Self::Diagram(e) => &e.bbox,
            Self::Arrow(e) => &e.bbox,
            Self::RotationSymbol(e) => &e.bbox,
            Self::SubAssembly(e) => &e.bbox,
            Self::SubStep(e) => &e.bbox,
            Self::BagNumber(e) => &e.bbox,
            Self::OpenBag(e) => &e.bbox,
            Self::ProgressBar(e) => &e.bbox,
            Self::ProgressBarIndicator(e) => &e.bbox,
            Self::Divider(e) => &e.bbox,
            Self::Background(e) => &e.bbox,
            Self::LoosePartSymbol(e) => &e.bbox,
            Self::Shine(e) => &e.bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let el = LegoPageElement::PartCount(PartCountElem {
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            value: 4,
        });
        assert_eq!(el.kind(), ElementKind::PartCount);
    }

    #[test]
    fn all_kinds_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in ElementKind::ALL {
            assert!(seen.insert(*kind), "duplicate kind in ElementKind::ALL");
        }
        assert_eq!(ElementKind::ALL.len(), 24);
    }
}
