//! Error types for Vellum.

use std::io;

/// Errors produced by the Vellum crates.
///
/// Missing or undecodable resources are not errors at the replacement level;
/// these variants surface only from the decoding, configuration and output
/// layers.
#[derive(Debug, thiserror::Error)]
pub enum VellumError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("loader error: {0}")]
    Loader(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PNG encode error: {0}")]
    PngEncode(#[from] png::EncodingError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VellumError>;
