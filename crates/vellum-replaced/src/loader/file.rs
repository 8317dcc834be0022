//! Local-file resource decoder.
//!
//! Serves `file://` URLs and bare relative paths from a root directory.
//! The root acts as a sandbox: `file:///img/a.png` maps to
//! `<root>/img/a.png`, and `..` segments are rejected outright.
//! Segments are percent-decoded before they touch the filesystem.

use std::fs;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;

use vellum_types::error::{Result, VellumError};

use crate::raster::RasterHandle;
use crate::url::Url;

use super::{DecodeLimits, ResourceDecoder, absent_on_error, decode_checked};

/// Decoder reading images from a directory tree.
#[derive(Debug, Clone)]
pub struct FileDecoder {
    root: PathBuf,
    limits: DecodeLimits,
}

impl FileDecoder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            limits: DecodeLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Map a URI to a path under the root.
    pub fn resolve_path(&self, uri: &str) -> Result<PathBuf> {
        let relative = match Url::parse(uri) {
            Some(url) if url.scheme == "file" => url.path,
            Some(url) => {
                return Err(VellumError::Loader(format!(
                    "unsupported scheme for file loader: {}",
                    url.scheme
                )));
            },
            None => uri
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        let mut path = self.root.clone();
        for seg in relative.split('/') {
            let seg = decode_segment(seg)?;
            if !seg.is_empty() && seg != "." {
                path.push(seg);
            }
        }
        if path == self.root {
            return Err(VellumError::Loader(format!("{uri}: no file name")));
        }
        Ok(path)
    }

    fn load(&self, uri: &str) -> Result<RasterHandle> {
        let path = self.resolve_path(uri)?;
        let bytes = fs::read(&path)?;
        decode_checked(uri, &bytes, self.limits)
    }
}

impl ResourceDecoder for FileDecoder {
    fn decode(&self, uri: &str) -> Option<RasterHandle> {
        absent_on_error(uri, self.load(uri))
    }
}

/// Percent-decode one path segment, rejecting `..` and anything that would
/// introduce a separator after decoding.
fn decode_segment(seg: &str) -> Result<String> {
    let decoded = percent_decode_str(seg)
        .decode_utf8()
        .map_err(|e| VellumError::Loader(format!("invalid path segment {seg:?}: {e}")))?;
    if decoded == ".." || decoded.contains(['/', '\\', '\0']) {
        return Err(VellumError::Loader("path traversal not allowed".to_string()));
    }
    Ok(decoded.into_owned())
}
