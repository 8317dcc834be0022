//! Foundation types for Vellum.
//!
//! Geometry, colors and the shared error type used by every Vellum crate.

pub mod color;
pub mod error;
pub mod geometry;
