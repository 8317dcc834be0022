//! In-memory resource decoder.
//!
//! Holds encoded bytes keyed by URI. Useful for tests, embedded assets and
//! documents whose resources were fetched ahead of time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::raster::RasterHandle;

use super::{DecodeLimits, ResourceDecoder, absent_on_error, decode_checked};

/// A decoder over a fixed URI → bytes table.
#[derive(Debug, Default)]
pub struct MemoryDecoder {
    resources: HashMap<String, Vec<u8>>,
    limits: DecodeLimits,
    decodes: AtomicUsize,
}

impl MemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_resource(mut self, uri: &str, bytes: Vec<u8>) -> Self {
        self.insert(uri, bytes);
        self
    }

    /// Add or replace the encoded bytes served for `uri`.
    pub fn insert(&mut self, uri: &str, bytes: Vec<u8>) {
        self.resources.insert(uri.to_string(), bytes);
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.resources.contains_key(uri)
    }

    /// Number of decode attempts made for URIs present in the table.
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }
}

impl ResourceDecoder for MemoryDecoder {
    fn decode(&self, uri: &str) -> Option<RasterHandle> {
        let Some(bytes) = self.resources.get(uri) else {
            log::warn!("image unavailable: {uri}: no such resource");
            return None;
        };
        self.decodes.fetch_add(1, Ordering::Relaxed);
        absent_on_error(uri, decode_checked(uri, bytes, self.limits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterImage;
    use crate::test_utils::encode_png;
    use vellum_types::color::Color;

    #[test]
    fn decodes_known_resource() {
        let dec = MemoryDecoder::new()
            .with_resource("pic.png", encode_png(&RasterImage::solid(10, 5, Color::WHITE)));
        let img = dec.decode("pic.png").expect("decoded");
        assert_eq!((img.width(), img.height()), (10, 5));
        assert_eq!(dec.decode_count(), 1);
    }

    #[test]
    fn unknown_uri_is_absent() {
        let dec = MemoryDecoder::new();
        assert!(dec.decode("missing.png").is_none());
        assert_eq!(dec.decode_count(), 0);
    }

    #[test]
    fn corrupt_bytes_are_absent() {
        let dec = MemoryDecoder::new().with_resource("bad.png", b"\x89PNG\r\n\x1a\nnope".to_vec());
        assert!(dec.decode("bad.png").is_none());
        assert_eq!(dec.decode_count(), 1);
    }

    #[test]
    fn limits_apply() {
        let dec = MemoryDecoder::new()
            .with_limits(DecodeLimits { max_dimension: 4 })
            .with_resource("big.png", encode_png(&RasterImage::solid(5, 1, Color::WHITE)));
        assert!(dec.decode("big.png").is_none());
    }

    #[test]
    fn each_decode_yields_a_fresh_handle() {
        let dec = MemoryDecoder::new()
            .with_resource("a.png", encode_png(&RasterImage::solid(2, 2, Color::BLACK)));
        let a = dec.decode("a.png").unwrap();
        let b = dec.decode("a.png").unwrap();
        assert_eq!(*a, *b);
        assert!(!std::sync::Arc::ptr_eq(&a, &b));
    }
}
