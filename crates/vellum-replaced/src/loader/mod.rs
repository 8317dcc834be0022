//! Resource decoders: turn a URI into a shared decoded raster.
//!
//! From the replacement's point of view a decode is one synchronous call
//! with two outcomes, decoded or absent. Why a resource is absent (missing
//! file, bad scheme, corrupt bytes, too large) is logged here and goes no
//! further.

pub mod cache;
pub mod file;
pub mod memory;

use std::sync::Arc;

use vellum_types::error::{Result, VellumError};

use crate::raster::{self, RasterHandle};

/// Turns a URI into a decoded raster.
///
/// Implementations must be shareable across threads: a registry resolving
/// elements for several documents may call `decode` concurrently.
pub trait ResourceDecoder: Send + Sync {
    /// Fetch and decode `uri`. `None` means the resource is unavailable
    /// for any reason.
    fn decode(&self, uri: &str) -> Option<RasterHandle>;
}

impl<D: ResourceDecoder + ?Sized> ResourceDecoder for Arc<D> {
    fn decode(&self, uri: &str) -> Option<RasterHandle> {
        (**self).decode(uri)
    }
}

impl<D: ResourceDecoder + ?Sized> ResourceDecoder for &D {
    fn decode(&self, uri: &str) -> Option<RasterHandle> {
        (**self).decode(uri)
    }
}

/// Limits applied to every decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Images wider or taller than this are rejected.
    pub max_dimension: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_dimension: 4096,
        }
    }
}

/// Decode `bytes` fetched from `uri` and enforce `limits`.
///
/// The limits are checked against the header before any pixel data is
/// decoded.
pub(crate) fn decode_checked(uri: &str, bytes: &[u8], limits: DecodeLimits) -> Result<RasterHandle> {
    let (width, height) = raster::header_dimensions(bytes)?;
    if width > limits.max_dimension || height > limits.max_dimension {
        return Err(VellumError::Decode(format!(
            "{uri}: {width}x{height} exceeds the {}px limit",
            limits.max_dimension
        )));
    }
    let image = raster::decode(bytes)?;
    log::debug!("decoded {uri} ({}x{})", image.width(), image.height());
    Ok(Arc::new(image))
}

/// Collapse a decode result into the two-outcome form, logging the reason
/// for absence.
pub(crate) fn absent_on_error(uri: &str, result: Result<RasterHandle>) -> Option<RasterHandle> {
    match result {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("image unavailable: {uri}: {e}");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterImage;
    use crate::test_utils::{bmp_24bit_2x2, encode_png};
    use vellum_types::color::Color;

    #[test]
    fn decode_checked_accepts_within_limits() {
        let bytes = encode_png(&RasterImage::solid(8, 4, Color::WHITE));
        let handle = decode_checked("mem://a.png", &bytes, DecodeLimits::default()).unwrap();
        assert_eq!(handle.width(), 8);
    }

    #[test]
    fn decode_checked_rejects_oversized_images() {
        let bytes = encode_png(&RasterImage::solid(8, 4, Color::WHITE));
        let limits = DecodeLimits { max_dimension: 6 };
        let err = decode_checked("mem://a.png", &bytes, limits).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn oversized_header_is_rejected_before_pixels_are_read() {
        // A BMP header claiming 5000x5000 with no pixel data behind it.
        let mut bmp = bmp_24bit_2x2();
        bmp.truncate(54);
        bmp[18..22].copy_from_slice(&5000i32.to_le_bytes());
        bmp[22..26].copy_from_slice(&5000i32.to_le_bytes());
        let err = decode_checked("mem://huge.bmp", &bmp, DecodeLimits::default()).unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");
    }

    #[test]
    fn absent_on_error_maps_failures_to_none() {
        let err = Err(VellumError::Decode("bad".into()));
        assert!(absent_on_error("x", err).is_none());
    }

    #[test]
    fn arc_decoder_delegates() {
        let mem = memory::MemoryDecoder::new()
            .with_resource("a.png", encode_png(&RasterImage::solid(1, 1, Color::WHITE)));
        let shared: Arc<dyn ResourceDecoder> = Arc::new(mem);
        assert!(shared.decode("a.png").is_some());
        assert!(shared.decode("b.png").is_none());
    }
}
