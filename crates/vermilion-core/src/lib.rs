//! Vermilion Core
//!
//! This crate contains the foundation types shared by the Vermilion
//! rendering crates: colors, crop rectangles, and logging setup.

pub mod color;
pub mod geometry;
pub mod logging;

pub use color::Color;
pub use geometry::TextureRect;
