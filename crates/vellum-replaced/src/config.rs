//! Render configuration, loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use vellum_types::color::Color;
use vellum_types::error::{Result, VellumError};

use crate::loader::DecodeLimits;
use crate::loader::cache::CachingDecoder;
use crate::loader::file::FileDecoder;
use crate::url::Url;

/// Settings for resolving and drawing replaced elements.
///
/// Every field has a default, so an empty table is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Document base URL for relative `src` attributes.
    pub base_url: Option<String>,
    /// Directory the file decoder serves from. Relative paths in a config
    /// file are relative to that file.
    pub asset_root: PathBuf,
    /// Images wider or taller than this are treated as unavailable.
    pub max_image_dimension: u32,
    /// Decoded raster cache budget in bytes.
    pub cache_max_bytes: usize,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Canvas background as `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            asset_root: PathBuf::from("."),
            max_image_dimension: DecodeLimits::default().max_dimension,
            cache_max_bytes: 16 * 1024 * 1024,
            canvas_width: 800,
            canvas_height: 600,
            background: "#ffffff".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VellumError::Config(format!("render config: {e}")))
    }

    /// Read a config file. A relative `asset_root` is anchored at the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.anchor_at(dir);
        }
        log::debug!("loaded render config from {}", path.display());
        Ok(config)
    }

    /// Make a relative `asset_root` relative to `dir`.
    pub fn anchor_at(&mut self, dir: &Path) {
        if self.asset_root.is_relative() {
            self.asset_root = dir.join(&self.asset_root);
        }
    }

    pub fn limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_dimension: self.max_image_dimension,
        }
    }

    /// Parsed [`base_url`](Self::base_url); an unparsable value is an error.
    pub fn base(&self) -> Result<Option<Url>> {
        match &self.base_url {
            None => Ok(None),
            Some(raw) => Url::parse(raw)
                .map(Some)
                .ok_or_else(|| VellumError::Config(format!("invalid base_url: {raw}"))),
        }
    }

    pub fn background_color(&self) -> Result<Color> {
        parse_hex_color(&self.background)
            .ok_or_else(|| VellumError::Config(format!("invalid background: {}", self.background)))
    }

    /// A cached file decoder rooted at `asset_root`.
    pub fn build_decoder(&self) -> CachingDecoder<FileDecoder> {
        let files = FileDecoder::new(&self.asset_root).with_limits(self.limits());
        CachingDecoder::new(files, self.cache_max_bytes)
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().strip_prefix('#')?;
    if !s.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
    match s.len() {
        3 => {
            let mut c = [0u8; 3];
            for (out, ch) in c.iter_mut().zip(s.chars()) {
                let v = ch.to_digit(16)? as u8;
                *out = v * 17;
            }
            Some(Color::rgb(c[0], c[1], c[2]))
        },
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}
