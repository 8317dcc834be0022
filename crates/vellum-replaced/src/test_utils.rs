//! Shared test utilities: image fixtures, a recording surface and
//! instrumented replacements/probes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vellum_types::geometry::{Rect, Size};

use crate::dom::Element;
use crate::raster::RasterImage;
use crate::registry::{ReplacementProbe, ResolveContext};
use crate::replacement::Replacement;
use crate::surface::Surface;

/// Encode `image` as an 8-bit RGBA PNG.
pub fn encode_png(image: &RasterImage) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(image.pixels()).unwrap();
    }
    out
}

/// A 2x2 bottom-up 24-bit BMP. Decoded rows: top = blue, white;
/// bottom = red, green.
pub fn bmp_24bit_2x2() -> Vec<u8> {
    let mut bmp = Vec::with_capacity(70);
    // File header.
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&70u32.to_le_bytes());
    bmp.extend_from_slice(&[0; 4]);
    bmp.extend_from_slice(&54u32.to_le_bytes());
    // BITMAPINFOHEADER.
    bmp.extend_from_slice(&40u32.to_le_bytes());
    bmp.extend_from_slice(&2i32.to_le_bytes());
    bmp.extend_from_slice(&2i32.to_le_bytes());
    bmp.extend_from_slice(&1u16.to_le_bytes());
    bmp.extend_from_slice(&24u16.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes());
    bmp.extend_from_slice(&16u32.to_le_bytes());
    bmp.extend_from_slice(&[0; 16]);
    // Bottom row (BGR): red, green, padding.
    bmp.extend_from_slice(&[0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0, 0]);
    // Top row: blue, white, padding.
    bmp.extend_from_slice(&[0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0, 0]);
    bmp
}

/// A replacement with fixed intrinsic dimensions that draws nothing.
#[derive(Debug, Clone, Copy)]
pub struct FixedReplacement {
    width: Option<f32>,
    height: Option<f32>,
}

impl FixedReplacement {
    pub fn new(width: Option<f32>, height: Option<f32>) -> Self {
        Self { width, height }
    }
}

impl Replacement for FixedReplacement {
    fn intrinsic_width(&self) -> Option<f32> {
        self.width
    }

    fn intrinsic_height(&self) -> Option<f32> {
        self.height
    }

    fn draw(&self, _surface: &mut dyn Surface, _target: Rect) {}
}

/// A recorded `Surface::paint` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintCall {
    /// Source raster dimensions.
    pub size: (u32, u32),
    pub target: Rect,
}

/// A surface that records paint calls instead of drawing.
#[derive(Debug)]
pub struct RecordingSurface {
    size: Size,
    pub calls: Vec<PaintCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width as f32, height as f32),
            calls: Vec::new(),
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn paint(&mut self, raster: &RasterImage, target: Rect) {
        self.calls.push(PaintCall {
            size: (raster.width(), raster.height()),
            target,
        });
    }
}

/// Shared invocation counter handed out by [`CountingProbe::calls`].
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A probe that matches one tag with a [`FixedReplacement`] and counts how
/// often it is consulted.
#[derive(Debug)]
pub struct CountingProbe {
    name: String,
    tag: String,
    width: f32,
    height: f32,
    calls: CallCounter,
}

impl CountingProbe {
    pub fn matching(name: &str, tag: &str, width: f32, height: f32) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            width,
            height,
            calls: CallCounter::default(),
        }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl ReplacementProbe for CountingProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self, element: &Element, _cx: &ResolveContext<'_>) -> Option<Box<dyn Replacement>> {
        self.calls.bump();
        if !element.is(&self.tag) {
            return None;
        }
        Some(Box::new(FixedReplacement::new(
            Some(self.width),
            Some(self.height),
        )))
    }
}
