//! Raster image replacement and the `<img>` probe.

use vellum_types::geometry::Rect;

use crate::dom::Element;
use crate::loader::ResourceDecoder;
use crate::raster::RasterHandle;
use crate::registry::{ReplacementProbe, ResolveContext};
use crate::replacement::Replacement;
use crate::surface::Surface;

/// A replacement backed by a decoded bitmap.
///
/// The raster is absent when the resource could not be fetched or decoded.
/// An absent raster reports no intrinsic geometry and draws nothing; the
/// alt text is kept so the layout engine can render its own fallback.
#[derive(Debug, Clone, Default)]
pub struct ImageReplacement {
    raster: Option<RasterHandle>,
    alt: Option<String>,
}

impl ImageReplacement {
    /// Decode `uri` through `decoder`. Never fails: a missing URI or a
    /// failed decode yields a broken image.
    pub fn load(uri: Option<&str>, alt: Option<&str>, decoder: &dyn ResourceDecoder) -> Self {
        let raster = uri.and_then(|uri| decoder.decode(uri));
        if raster.is_none() {
            log::debug!("broken image: {}", uri.unwrap_or("<no src>"));
        }
        Self::from_raster(raster, alt)
    }

    /// Wrap an already-decoded handle.
    pub fn from_raster(raster: Option<RasterHandle>, alt: Option<&str>) -> Self {
        Self {
            raster,
            alt: alt.map(str::to_string),
        }
    }

    pub fn raster(&self) -> Option<&RasterHandle> {
        self.raster.as_ref()
    }

    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    /// Whether the image failed to load.
    pub fn is_broken(&self) -> bool {
        self.raster.is_none()
    }
}

impl Replacement for ImageReplacement {
    fn intrinsic_width(&self) -> Option<f32> {
        self.raster.as_ref().map(|r| r.width() as f32)
    }

    fn intrinsic_height(&self) -> Option<f32> {
        self.raster.as_ref().map(|r| r.height() as f32)
    }

    fn draw(&self, surface: &mut dyn Surface, target: Rect) {
        debug_assert!(target.is_well_formed(), "malformed draw target: {target:?}");
        let Some(raster) = &self.raster else {
            return;
        };
        if !target.is_well_formed() {
            return;
        }
        // One untiled paint; repeating is the caller's business.
        surface.paint(raster, target);
    }
}

/// Probe for `<img src=... alt=...>`.
///
/// Claims every `img` element, including ones with no usable `src`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProbe;

impl ReplacementProbe for ImageProbe {
    fn name(&self) -> &str {
        "img"
    }

    fn probe(&self, element: &Element, cx: &ResolveContext<'_>) -> Option<Box<dyn Replacement>> {
        if !element.is("img") {
            return None;
        }
        let src = element.url_attribute("src", cx.base_url());
        let image = ImageReplacement::load(src.as_deref(), element.attr("alt"), cx.decoder());
        Some(Box::new(image))
    }
}
