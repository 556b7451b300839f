//! Shared scoring helpers for the text-pattern classifiers: PageNumber,
//! StepNumber, SubstepNumber, PartCount, PartNumber, PieceLength, and
//! BagNumber each match a regex against one text block, then disambiguate
//! between matches using font-size proximity to a `DocumentHints` estimate
//! and a position boost (`spec.md` §4.2).

use lego_core::BBox;

/// How closely `font_size` matches the document's modal size for this
/// label, in `[0.0, 1.0]`. Without a hint (too little data, e.g. a
/// single-page document), returns a neutral `0.5` rather than penalizing a
/// candidate that simply hasn't been corroborated yet.
#[must_use]
pub fn font_proximity_score(font_size: f64, hint_size: Option<f64>) -> f64 {
    match hint_size {
        Some(hint) if hint > 0.0 => {
            let relative_diff = (font_size - hint).abs() / hint;
            (1.0 - relative_diff).clamp(0.0, 1.0)
        }
        _ => 0.5,
    }
}

/// Combine a pattern-match base confidence with font-proximity and
/// position signals into one `[0.0, 1.0]` score. The regex match itself is
/// the strongest signal; font size and position mostly disambiguate
/// between several matches on the same page.
#[must_use]
pub fn combine_score(base: f64, font_score: f64, position_boost: f64) -> f64 {
    (0.55 * base + 0.3 * font_score + 0.15 * position_boost).clamp(0.0, 1.0)
}

/// `1.0` if `bbox` sits within `fraction` of the page's bottom, left, or
/// right edge; `0.0` otherwise. Page numbers and bag numbers cluster in a
/// page's margins.
#[must_use]
pub fn near_page_margin(bbox: &BBox, page_width: f64, page_height: f64, fraction: f64) -> f64 {
    let near_bottom = bbox.y1 >= page_height * (1.0 - fraction);
    let near_left = bbox.x0 <= page_width * fraction;
    let near_right = bbox.x1 >= page_width * (1.0 - fraction);
    f64::from(near_bottom || near_left || near_right)
}

/// `1.0` if `bbox` sits in the page's top-left quadrant, `0.0` otherwise —
/// the conventional position for a bag number next to an open-bag glyph.
#[must_use]
pub fn near_top_left(bbox: &BBox, page_width: f64, page_height: f64) -> f64 {
    f64::from(bbox.x0 <= page_width * 0.3 && bbox.y0 <= page_height * 0.3)
}

/// `1.0` if `bbox` sits outside the bottom margin band, `0.0` otherwise —
/// step numbers (unlike page numbers) sit in a page's body.
#[must_use]
pub fn not_bottom_band(bbox: &BBox, page_height: f64, fraction: f64) -> f64 {
    f64::from(bbox.y1 < page_height * (1.0 - fraction))
}
