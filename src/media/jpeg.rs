//! Filesystem image store producing size-capped JPEG files.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};
use tracing::{debug, warn};

use crate::error::Result;

use super::{ImageOptions, ImageStore, output_file_name};

/// Writes every image as `<dir>/<stem>.jpg`.
#[derive(Debug, Clone)]
pub struct JpegImageStore {
    dir: PathBuf,
    markup_prefix: String,
    options: ImageOptions,
    written: Vec<PathBuf>,
}

impl JpegImageStore {
    /// Store images in `dir`, referencing them as `<markup_prefix>/<name>`
    /// (or the bare name when the prefix is empty).
    pub fn new(dir: impl Into<PathBuf>, markup_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            markup_prefix: markup_prefix.into(),
            options: ImageOptions::default(),
            written: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn reference(&self, name: &str) -> String {
        let prefix = self.markup_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }
}

impl ImageStore for JpegImageStore {
    fn extract_and_resize(&mut self, part_name: &str, bytes: &[u8]) -> Result<String> {
        let name = output_file_name(part_name);

        match reencode_jpeg(bytes, &self.options)? {
            Some(jpeg) => {
                let path = self.dir.join(&name);
                fs::write(&path, &jpeg)?;
                debug!(part = part_name, path = %path.display(), bytes = jpeg.len(), "stored image");
                self.written.push(path);
            }
            None => warn!(part = part_name, "unsupported image format, not stored"),
        }

        Ok(self.reference(&name))
    }
}

/// Decode an image, cap its size and encode it as JPEG.
///
/// Returns `None` when the bytes are not in a format the decoder supports.
pub fn reencode_jpeg(bytes: &[u8], options: &ImageOptions) -> Result<Option<Vec<u8>>> {
    let Ok(format) = image::guess_format(bytes) else {
        return Ok(None);
    };

    // Recognised but not compiled in (e.g. WebP) counts as unknown.
    let img = match image::load_from_memory_with_format(bytes, format) {
        Ok(img) => img,
        Err(ImageError::Unsupported(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let img = fit_within(img, options.max_dimension);
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, options.jpeg_quality);
    rgb.write_with_encoder(encoder)?;

    Ok(Some(buffer.into_inner()))
}

fn fit_within(img: DynamicImage, max: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if max == 0 || (width <= max && height <= max) {
        return img;
    }
    img.resize(max, max, FilterType::Lanczos3)
}
