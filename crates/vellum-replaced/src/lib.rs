//! Replaced elements for the Vellum renderer.
//!
//! A *replaced element* is a markup element whose rendered content comes
//! from an external resource (an `<img>`, eventually `<video>`, `<object>`,
//! ...) instead of from laying out its children. This crate decides which
//! elements are replaced and exposes what a layout engine needs from them:
//!
//! - a [`Registry`] of probes, consulted in registration order, first match
//!   wins;
//! - the [`Replacement`] contract: intrinsic width, height and ratio for the
//!   replaced-element sizing algorithm, plus `draw` for the final paint;
//! - [`ImageReplacement`], backed by a shared decoded raster that may be
//!   absent when the resource could not be loaded.
//!
//! Fetching and decoding is delegated to a [`ResourceDecoder`]; drawing goes
//! through the [`Surface`] primitive.
//!
//! # Example
//!
//! ```no_run
//! use vellum_replaced::{Element, MemoryDecoder, Registry, ResolveContext};
//!
//! let registry = Registry::with_builtin_probes();
//! let decoder = MemoryDecoder::new();
//! let cx = ResolveContext::new(&decoder);
//!
//! let img = Element::new("img").with_attr("src", "pic.png");
//! if let Some(replacement) = registry.resolve(&img, &cx) {
//!     println!("ratio: {:?}", replacement.intrinsic_ratio());
//! }
//! ```

pub mod config;
pub mod dom;
pub mod image;
pub mod loader;
pub mod raster;
pub mod registry;
pub mod replacement;
pub mod surface;
pub mod url;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::RenderConfig;
pub use dom::Element;
pub use image::{ImageProbe, ImageReplacement};
pub use loader::cache::CachingDecoder;
pub use loader::file::FileDecoder;
pub use loader::memory::MemoryDecoder;
pub use loader::{DecodeLimits, ResourceDecoder};
pub use raster::{RasterHandle, RasterImage};
pub use registry::{Registry, ReplacementProbe, ResolveContext};
pub use replacement::Replacement;
pub use surface::{Canvas, Surface};
pub use url::Url;

pub use vellum_types::color::Color;
pub use vellum_types::error::{Result, VellumError};
pub use vellum_types::geometry::{Rect, Size};
