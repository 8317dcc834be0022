//! RGBA colors.

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The color as `[r, g, b, a]` bytes.
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::rgba(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// Composite `src` over `dst` (straight, non-premultiplied alpha).
pub fn blend_over(src: Color, dst: Color) -> Color {
    match src.a {
        255 => src,
        0 => dst,
        sa => {
            let sa = sa as u32;
            let da = dst.a as u32;
            // out_a = sa + da * (1 - sa), all in 0..=255 fixed point.
            let out_a = sa + da * (255 - sa) / 255;
            if out_a == 0 {
                return Color::TRANSPARENT;
            }
            let channel = |s: u8, d: u8| -> u8 {
                let num = s as u32 * sa + d as u32 * da * (255 - sa) / 255;
                ((num + out_a / 2) / out_a).min(255) as u8
            };
            Color::rgba(
                channel(src.r, dst.r),
                channel(src.g, dst.g),
                channel(src.b, dst.b),
                out_a as u8,
            )
        },
    }
}
