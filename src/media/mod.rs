//! Embedded image handling.
//!
//! The markup converter only ever sees a [`MediaResolver`]: it hands over a
//! package part name and receives the reference to emit in `![](...)`.
//! Fetching the bytes is the pipeline's job, re-encoding them is an
//! [`ImageStore`]'s.

mod jpeg;

pub use jpeg::{JpegImageStore, reencode_jpeg};

use crate::error::Result;

/// Longest side, in pixels, of a stored image.
pub const DEFAULT_MAX_DIMENSION: u32 = 800;

/// JPEG quality factor of a stored image.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Image re-encoding settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    /// Neither side of the output exceeds this (uniform scale-down).
    pub max_dimension: u32,
    /// JPEG quality factor (1-100).
    pub jpeg_quality: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageOptions {
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

/// Destination for extracted images.
pub trait ImageStore {
    /// Store the image found at `part_name` and return the relative
    /// reference to embed in markup.
    fn extract_and_resize(&mut self, part_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Resolves a package image part to a markup reference.
pub trait MediaResolver {
    fn insert_image(&mut self, part_name: &str) -> Result<String>;
}

/// Output file name for an image part: its base name with a `.jpg` extension.
pub fn output_file_name(part_name: &str) -> String {
    let base = part_name.rsplit('/').next().unwrap_or(part_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    format!("{stem}.jpg")
}
