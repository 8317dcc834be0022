//! Drawing surfaces.
//!
//! [`Surface`] is the one primitive replacements draw through: paint a
//! raster into a rectangle. [`Canvas`] is the in-memory RGBA implementation
//! used for PNG output and tests.

use std::fs;
use std::ops::Range;
use std::path::Path;

use vellum_types::color::{Color, blend_over};
use vellum_types::error::{Result, VellumError};
use vellum_types::geometry::{Rect, Size};

use crate::raster::RasterImage;

/// A 2D output surface addressable by rectangles.
pub trait Surface {
    /// Surface extent in device pixels.
    fn size(&self) -> Size;

    /// Paint the whole of `raster`, scaled to `target`, clipped to the
    /// surface. One untiled paint per call.
    fn paint(&mut self, raster: &RasterImage, target: Rect);
}

/// An RGBA8 pixmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Create a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            pixels: background
                .to_bytes()
                .repeat(width as usize * height as usize),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let i = self.index(x, y)?;
        Some(Color::from_bytes([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]))
    }

    /// Encode the canvas as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        if self.width == 0 || self.height == 0 {
            return Err(VellumError::Surface(format!(
                "cannot encode a {}x{} canvas",
                self.width, self.height
            )));
        }
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
        }
        Ok(out)
    }

    /// Write the canvas to `path` as PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        fs::write(path, self.encode_png()?)?;
        log::debug!("wrote {}x{} canvas to {}", self.width, self.height, path.display());
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    fn blend(&mut self, x: u32, y: u32, src: Color) {
        if let Some(i) = self.index(x, y) {
            let dst = Color::from_bytes([
                self.pixels[i],
                self.pixels[i + 1],
                self.pixels[i + 2],
                self.pixels[i + 3],
            ]);
            let out = blend_over(src, dst);
            self.pixels[i..i + 4].copy_from_slice(&out.to_bytes());
        }
    }

    /// Snap a rectangle to device pixel edges `[x0, x1) x [y0, y1)`,
    /// unclipped and kept in `f64` so far-off coordinates cannot overflow.
    /// `None` for malformed or empty rectangles.
    fn device_bounds(&self, rect: Rect) -> Option<DeviceRect> {
        if !rect.is_well_formed() {
            return None;
        }
        let bounds = DeviceRect {
            x0: f64::from(rect.x.round()),
            y0: f64::from(rect.y.round()),
            x1: f64::from(rect.right().round()),
            y1: f64::from(rect.bottom().round()),
        };
        (bounds.x1 > bounds.x0 && bounds.y1 > bounds.y0).then_some(bounds)
    }
}

#[derive(Debug, Clone, Copy)]
struct DeviceRect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

/// Pixel indices of `[lo, hi)` that fall inside `0..limit`.
fn clip_span(lo: f64, hi: f64, limit: u32) -> Range<u32> {
    let limit = f64::from(limit);
    lo.clamp(0.0, limit) as u32..hi.clamp(0.0, limit) as u32
}

impl Surface for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    fn paint(&mut self, raster: &RasterImage, target: Rect) {
        if raster.width() == 0 || raster.height() == 0 {
            return;
        }
        let Some(b) = self.device_bounds(target) else {
            return;
        };
        let tw = b.x1 - b.x0;
        let th = b.y1 - b.y0;
        let sw = f64::from(raster.width());
        let sh = f64::from(raster.height());

        for dy in clip_span(b.y0, b.y1, self.height) {
            // Nearest-neighbour: sample the source at the destination
            // pixel's centre.
            let sy = ((f64::from(dy) - b.y0 + 0.5) * sh / th) as u32;
            let sy = sy.min(raster.height() - 1);
            for dx in clip_span(b.x0, b.x1, self.width) {
                let sx = ((f64::from(dx) - b.x0 + 0.5) * sw / tw) as u32;
                let sx = sx.min(raster.width() - 1);
                if let Some(src) = raster.pixel(sx, sy) {
                    self.blend(dx, dy, src);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrants() -> RasterImage {
        // 2x2: red, green / blue, white.
        let mut px = Vec::new();
        for c in [
            Color::rgb(255, 0, 0),
            Color::rgb(0, 255, 0),
            Color::rgb(0, 0, 255),
            Color::WHITE,
        ] {
            px.extend_from_slice(&c.to_bytes());
        }
        RasterImage::new(2, 2, px).unwrap()
    }

    #[test]
    fn new_canvas_is_background() {
        let c = Canvas::new(3, 2, Color::rgb(9, 9, 9));
        assert_eq!(c.pixels().len(), 24);
        assert_eq!(c.pixel(2, 1), Some(Color::rgb(9, 9, 9)));
        assert_eq!(c.pixel(3, 0), None);
        assert_eq!(c.size(), Size::new(3.0, 2.0));
    }

    #[test]
    fn paint_at_natural_size_copies_pixels() {
        let mut c = Canvas::new(4, 4, Color::BLACK);
        c.paint(&quadrants(), Rect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(c.pixel(1, 1), Some(Color::rgb(255, 0, 0)));
        assert_eq!(c.pixel(2, 1), Some(Color::rgb(0, 255, 0)));
        assert_eq!(c.pixel(1, 2), Some(Color::rgb(0, 0, 255)));
        assert_eq!(c.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(c.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(c.pixel(3, 3), Some(Color::BLACK));
    }

    #[test]
    fn paint_scales_to_target() {
        let mut c = Canvas::new(4, 4, Color::BLACK);
        c.paint(&quadrants(), Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(c.pixel(0, 0), Some(Color::rgb(255, 0, 0)));
        assert_eq!(c.pixel(1, 1), Some(Color::rgb(255, 0, 0)));
        assert_eq!(c.pixel(3, 0), Some(Color::rgb(0, 255, 0)));
        assert_eq!(c.pixel(0, 3), Some(Color::rgb(0, 0, 255)));
        assert_eq!(c.pixel(3, 3), Some(Color::WHITE));
    }

    #[test]
    fn paint_clips_to_canvas() {
        let mut c = Canvas::new(2, 2, Color::BLACK);
        c.paint(&quadrants(), Rect::new(-1.0, -1.0, 2.0, 2.0));
        // Only the bottom-right source pixel lands on the canvas.
        assert_eq!(c.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(c.pixel(1, 0), Some(Color::BLACK));
        assert_eq!(c.pixel(0, 1), Some(Color::BLACK));
    }

    #[test]
    fn paint_ignores_empty_and_malformed_targets() {
        let mut c = Canvas::new(2, 2, Color::BLACK);
        let before = c.clone();
        c.paint(&quadrants(), Rect::new(0.0, 0.0, 0.0, 2.0));
        c.paint(&quadrants(), Rect::new(f32::NAN, 0.0, 2.0, 2.0));
        c.paint(&quadrants(), Rect::new(5.0, 5.0, 2.0, 2.0));
        assert_eq!(c, before);
    }

    #[test]
    fn opaque_paint_is_idempotent() {
        let img = quadrants();
        let target = Rect::new(0.5, 0.0, 3.0, 3.0);
        let mut once = Canvas::new(4, 4, Color::rgb(10, 10, 10));
        once.paint(&img, target);
        let mut twice = once.clone();
        twice.paint(&img, target);
        assert_eq!(once, twice);
    }

    #[test]
    fn translucent_paint_blends() {
        let img = RasterImage::solid(1, 1, Color::rgba(255, 255, 255, 0));
        let mut c = Canvas::new(1, 1, Color::rgb(1, 2, 3));
        c.paint(&img, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(c.pixel(0, 0), Some(Color::rgb(1, 2, 3)));
    }

    #[test]
    fn paint_snaps_fractional_edges() {
        let mut c = Canvas::new(4, 1, Color::BLACK);
        c.paint(&RasterImage::solid(1, 1, Color::WHITE), Rect::new(0.6, 0.0, 2.0, 1.0));
        assert_eq!(c.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(c.pixel(1, 0), Some(Color::WHITE));
        assert_eq!(c.pixel(2, 0), Some(Color::WHITE));
        assert_eq!(c.pixel(3, 0), Some(Color::BLACK));
    }

    #[test]
    fn huge_target_coordinates_do_not_overflow() {
        let mut c = Canvas::new(4, 4, Color::WHITE);
        // Spans the canvas: left half of the source lands left of it.
        c.paint(&quadrants(), Rect::new(-1.0e19, 0.0, 2.0e19, 4.0));
        assert_eq!(c.pixel(0, 0), Some(Color::rgb(0, 255, 0)));
        assert_eq!(c.pixel(3, 3), Some(Color::WHITE));

        let before = c.clone();
        c.paint(&quadrants(), Rect::new(1.0e19, 1.0e19, 4.0, 4.0));
        c.paint(&quadrants(), Rect::new(-3.0e38, -3.0e38, 1.0, 1.0));
        c.paint(&quadrants(), Rect::new(3.0e38, 0.0, 3.0e38, 4.0));
        assert_eq!(c, before);
    }

    #[test]
    fn encode_png_round_trips_through_decoder() {
        let mut c = Canvas::new(3, 2, Color::WHITE);
        let red = RasterImage::solid(1, 1, Color::rgb(255, 0, 0));
        c.paint(&red, Rect::new(0.0, 0.0, 1.0, 1.0));
        let bytes = c.encode_png().unwrap();
        let img = crate::raster::decode(&bytes).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.pixels(), c.pixels());
    }

    #[test]
    fn encode_empty_canvas_fails() {
        assert!(Canvas::new(0, 5, Color::WHITE).encode_png().is_err());
    }

    #[test]
    fn save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        Canvas::new(2, 2, Color::WHITE).save_png(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
