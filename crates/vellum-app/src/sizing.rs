//! Used size of a replaced element from its attributes and intrinsic
//! geometry.
//!
//! A simplified form of the CSS replaced-element sizing rules:
//!
//! - both `width` and `height` given: use them;
//! - one given: derive the other through the intrinsic ratio, falling back
//!   to the intrinsic dimension;
//! - neither given: intrinsic dimensions, filling a missing one through the
//!   ratio.
//!
//! Anything still unknown is zero, so a broken image without explicit
//! dimensions collapses to an empty box.

use vellum_replaced::{Element, Replacement};
use vellum_types::geometry::Size;

pub fn used_size(element: &Element, replacement: &dyn Replacement) -> Size {
    let ratio = replacement.intrinsic_ratio();
    let iw = replacement.intrinsic_width();
    let ih = replacement.intrinsic_height();

    let (w, h) = match (element.length_attr("width"), element.length_attr("height")) {
        (Some(w), Some(h)) => (Some(w), Some(h)),
        (Some(w), None) => (Some(w), ratio.map(|r| w / r).or(ih)),
        (None, Some(h)) => (ratio.map(|r| h * r).or(iw), Some(h)),
        (None, None) => match (iw, ih, ratio) {
            (Some(w), None, Some(r)) => (Some(w), Some(w / r)),
            (None, Some(h), Some(r)) => (Some(h * r), Some(h)),
            _ => (iw, ih),
        },
    };
    Size::new(w.unwrap_or(0.0), h.unwrap_or(0.0))
}
