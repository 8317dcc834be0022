//! Decoded raster images and the byte-level decoders that produce them.

use std::sync::Arc;

use vellum_types::color::Color;
use vellum_types::error::{Result, VellumError};

/// Decoded image data (straight-alpha RGBA, 4 bytes per pixel, row-major).
///
/// Immutable once built; replacements share it through a [`RasterHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Shared, read-only handle to a decoded raster.
pub type RasterHandle = Arc<RasterImage>;

impl RasterImage {
    /// Build a raster from RGBA bytes. The buffer length must be exactly
    /// `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(VellumError::Decode(format!(
                "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A raster filled with one color.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let pixels = color.to_bytes().repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Color at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }
}

/// Image container format, sniffed from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Bmp,
    Jpeg,
    Gif,
    Unknown,
}

/// Detect the container format from the first bytes of the data.
pub fn detect_format(data: &[u8]) -> ImageFormat {
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        ImageFormat::Png
    } else if data.starts_with(b"BM") {
        ImageFormat::Bmp
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        ImageFormat::Jpeg
    } else if data.starts_with(b"GIF8") {
        ImageFormat::Gif
    } else {
        ImageFormat::Unknown
    }
}

/// Decode encoded image bytes into an RGBA raster.
pub fn decode(data: &[u8]) -> Result<RasterImage> {
    match detect_format(data) {
        ImageFormat::Png => decode_png(data),
        ImageFormat::Bmp => decode_bmp(data),
        format => Err(VellumError::Decode(format!(
            "unsupported image format: {format:?}"
        ))),
    }
}

/// Image dimensions read from the container header alone, without
/// decoding any pixel data.
pub fn header_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    match detect_format(data) {
        ImageFormat::Png => {
            let reader = png::Decoder::new(data)
                .read_info()
                .map_err(|e| VellumError::Decode(format!("PNG header: {e}")))?;
            let info = reader.info();
            Ok((info.width, info.height))
        },
        ImageFormat::Bmp => BmpHeader::parse(data).map(|h| (h.width, h.height)),
        format => Err(VellumError::Decode(format!(
            "unsupported image format: {format:?}"
        ))),
    }
}

fn decode_png(data: &[u8]) -> Result<RasterImage> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| VellumError::Decode(format!("PNG header: {e}")))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| VellumError::Decode(format!("PNG frame: {e}")))?;
    if info.bit_depth != png::BitDepth::Eight {
        return Err(VellumError::Decode(format!(
            "PNG bit depth {:?} after expansion",
            info.bit_depth
        )));
    }

    let (width, height) = (info.width, info.height);
    let src = &buf[..info.buffer_size()];
    let row_len = info.line_size;
    let channels = info.color_type.samples();
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);

    for row in src.chunks(row_len).take(height as usize) {
        for px in row[..width as usize * channels].chunks_exact(channels) {
            let rgba = match info.color_type {
                png::ColorType::Grayscale => [px[0], px[0], px[0], 255],
                png::ColorType::GrayscaleAlpha => [px[0], px[0], px[0], px[1]],
                png::ColorType::Rgb => [px[0], px[1], px[2], 255],
                png::ColorType::Rgba => [px[0], px[1], px[2], px[3]],
                png::ColorType::Indexed => {
                    return Err(VellumError::Decode(
                        "indexed PNG was not expanded".to_string(),
                    ));
                },
            };
            pixels.extend_from_slice(&rgba);
        }
    }

    RasterImage::new(width, height, pixels)
}

/// The fields of a BMP `BITMAPINFOHEADER` the decoder uses.
#[derive(Debug, Clone, Copy)]
struct BmpHeader {
    pixel_offset: usize,
    width: u32,
    height: u32,
    bottom_up: bool,
    bytes_per_pixel: usize,
}

impl BmpHeader {
    const LEN: usize = 54;

    /// Parse and validate the header of an uncompressed 24- or 32-bit BMP.
    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(VellumError::Decode("BMP header truncated".to_string()));
        }
        let u32_at = |i: usize| u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        let i32_at = |i: usize| i32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);

        let width = i32_at(18);
        let height = i32_at(22);
        let bpp = u16::from_le_bytes([data[28], data[29]]);
        let compression = u32_at(30);

        if width <= 0 || height == 0 {
            return Err(VellumError::Decode(format!(
                "BMP has invalid dimensions {width}x{height}"
            )));
        }
        if compression != 0 || (bpp != 24 && bpp != 32) {
            return Err(VellumError::Decode(format!(
                "BMP variant not supported (bpp {bpp}, compression {compression})"
            )));
        }
        Ok(Self {
            pixel_offset: u32_at(10) as usize,
            width: width.unsigned_abs(),
            height: height.unsigned_abs(),
            bottom_up: height > 0,
            bytes_per_pixel: (bpp / 8) as usize,
        })
    }

    /// Bytes per stored row; rows are padded to a 4-byte boundary.
    fn row_size(&self) -> usize {
        (self.width as usize * self.bytes_per_pixel).div_ceil(4) * 4
    }
}

/// Decode an uncompressed 24- or 32-bit BMP.
fn decode_bmp(data: &[u8]) -> Result<RasterImage> {
    let header = BmpHeader::parse(data)?;
    let w = header.width as usize;
    let h = header.height as usize;
    let bpp = header.bytes_per_pixel;
    let row_size = header.row_size();
    let end = row_size
        .checked_mul(h)
        .and_then(|n| n.checked_add(header.pixel_offset));
    if end.is_none_or(|end| end > data.len()) {
        return Err(VellumError::Decode("BMP pixel data truncated".to_string()));
    }

    let mut pixels = Vec::with_capacity(w * h * 4);
    for row in 0..h {
        let src_row = if header.bottom_up { h - 1 - row } else { row };
        let start = header.pixel_offset + src_row * row_size;
        for px in data[start..start + w * bpp].chunks_exact(bpp) {
            // BGR(A) on disk.
            let alpha = if bpp == 4 { px[3] } else { 255 };
            pixels.extend_from_slice(&[px[2], px[1], px[0], alpha]);
        }
    }

    RasterImage::new(header.width, header.height, pixels)
}
