//! Dot-grid images of cell sequences.

pub mod geometry;
pub mod image;
pub mod recognize;
pub mod render;
pub mod threshold;

pub use geometry::Geometry;
pub use image::RasterImage;
pub use recognize::{recognize, Diagnostic, Recognition};
pub use render::rasterize;
