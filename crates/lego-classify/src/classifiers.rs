//! Every classifier the pipeline knows about, plus the geometry/text-pattern
//! helper modules they share.
//!
//! Split into one file per produced label, the way a large extraction rule
//! set earns its own module per document field rather than one monolithic
//! dispatcher (`spec.md` §4.2).

mod arrow;
mod background;
mod bag_number;
mod diagram;
mod divider;
mod geometry_shape;
mod loose_part_symbol;
mod open_bag;
mod page_number;
mod part;
mod part_count;
mod part_image;
mod part_number;
mod parts_list;
mod piece_length;
mod progress_bar;
mod progress_bar_indicator;
mod rotation_symbol;
mod shine;
mod step;
mod step_number;
mod sub_assembly;
mod sub_step;
mod substep_number;
mod text_pattern;
mod util;

pub use arrow::ArrowClassifier;
pub use background::BackgroundClassifier;
pub use bag_number::BagNumberClassifier;
pub use diagram::DiagramClassifier;
pub use divider::DividerClassifier;
pub use loose_part_symbol::LoosePartSymbolClassifier;
pub use open_bag::OpenBagClassifier;
pub use page_number::PageNumberClassifier;
pub use part::PartsClassifier;
pub use part_count::PartCountClassifier;
pub use part_image::PartImageClassifier;
pub use part_number::PartNumberClassifier;
pub use parts_list::PartsListClassifier;
pub use piece_length::PieceLengthClassifier;
pub use progress_bar::ProgressBarClassifier;
pub use progress_bar_indicator::ProgressBarIndicatorClassifier;
pub use rotation_symbol::RotationSymbolClassifier;
pub use shine::ShineClassifier;
pub use step::StepClassifier;
pub use step_number::StepNumberClassifier;
pub use sub_assembly::SubAssemblyClassifier;
pub use sub_step::SubStepClassifier;
pub use substep_number::SubstepNumberClassifier;

use crate::classifier::Classifier;

/// Every classifier the pipeline can run, in no particular order — the
/// pipeline topologically sorts them by `requires`/`output` before running
/// (`spec.md` §4.3).
#[must_use]
pub fn all_classifiers() -> Vec<Box<dyn Classifier>> {
    vec![
        Box::new(PageNumberClassifier),
        Box::new(StepNumberClassifier),
        Box::new(SubstepNumberClassifier),
        Box::new(PartCountClassifier),
        Box::new(PartImageClassifier),
        Box::new(PartNumberClassifier),
        Box::new(PieceLengthClassifier),
        Box::new(BagNumberClassifier),
        Box::new(DiagramClassifier),
        Box::new(ArrowClassifier),
        Box::new(RotationSymbolClassifier),
        Box::new(ProgressBarIndicatorClassifier),
        Box::new(DividerClassifier),
        Box::new(BackgroundClassifier),
        Box::new(LoosePartSymbolClassifier),
        Box::new(ShineClassifier),
        Box::new(PartsClassifier),
        Box::new(PartsListClassifier),
        Box::new(StepClassifier),
        Box::new(SubStepClassifier),
        Box::new(SubAssemblyClassifier),
        Box::new(OpenBagClassifier),
        Box::new(ProgressBarClassifier),
    ]
}
