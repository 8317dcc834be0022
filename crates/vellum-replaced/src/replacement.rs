//! The replaced-element contract consumed by layout and paint.

use std::fmt::Debug;

use vellum_types::geometry::Rect;

use crate::surface::Surface;

/// Content of a replaced element.
///
/// The layout engine reads the intrinsic geometry to size the element's
/// box, then calls [`draw`](Replacement::draw) with the final on-surface
/// rectangle. Every query is side-effect free and stable: a replacement
/// reports the same intrinsic geometry for its whole lifetime.
///
/// "No intrinsic dimension" is `None`, never zero-as-sentinel and never an
/// error; the replaced-element sizing algorithm branches on it.
pub trait Replacement: Debug + Send + Sync {
    /// Natural width in the resource's own unit (device pixels for
    /// rasters), or `None` if the resource has none.
    fn intrinsic_width(&self) -> Option<f32>;

    /// Natural height, symmetric to [`intrinsic_width`](Replacement::intrinsic_width).
    fn intrinsic_height(&self) -> Option<f32>;

    /// Natural width-to-height ratio.
    ///
    /// Defaults to `width / height` when both are defined and strictly
    /// positive. Variants with a ratio but no absolute size (vector
    /// content) override this.
    fn intrinsic_ratio(&self) -> Option<f32> {
        ratio_of(self.intrinsic_width(), self.intrinsic_height())
    }

    /// Paint the content into `target` on `surface`.
    ///
    /// Must not depend on or change layout state, and must give the same
    /// result when repeated with the same target. Content that failed to
    /// load paints nothing.
    fn draw(&self, surface: &mut dyn Surface, target: Rect);
}

/// The intrinsic-ratio rule: defined only when both dimensions are defined
/// and strictly positive.
pub fn ratio_of(width: Option<f32>, height: Option<f32>) -> Option<f32> {
    match (width, height) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(w / h),
        _ => None,
    }
}
