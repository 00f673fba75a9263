//! # docxconv
//!
//! Converts Word `.docx` packages into kramdown-style markup, split into
//! chapters, and optionally renders the chapters to HTML or LaTeX.
//!
//! ## Features
//!
//! - Headings, titles, quotes, bold/italic runs and character styles
//! - Footnotes, collected per chapter as `[^id]: text` definitions
//! - Tables as pipe rows, page and line breaks
//! - Embedded images extracted as size-capped JPEG files
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxconv::{ConvertOptions, Converter, OutputFormat};
//!
//! let options = ConvertOptions::new("out").with_format(OutputFormat::Html);
//! let report = Converter::new(options).convert_file("manuscript.docx")?;
//! for file in &report.files {
//!     println!("{file}");
//! }
//! # Ok::<(), docxconv::Error>(())
//! ```
//!
//! ## Working in Memory
//!
//! [`convert_parts`] takes the XML parts directly and any
//! [`MediaResolver`](media::MediaResolver), which keeps the filesystem out of
//! the picture:
//!
//! ```
//! use docxconv::convert_parts;
//! use docxconv::media::MediaResolver;
//!
//! struct NoImages;
//!
//! impl MediaResolver for NoImages {
//!     fn insert_image(&mut self, part: &str) -> docxconv::Result<String> {
//!         Ok(part.to_string())
//!     }
//! }
//!
//! let document = r#"<w:document xmlns:w="urn:w"><w:body>
//!   <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>
//! </w:body></w:document>"#;
//!
//! let conversion = convert_parts(document, None, "<Relationships/>", &mut NoImages, true)?;
//! assert_eq!(conversion.body, "# Intro\n\n");
//! assert_eq!(conversion.chapters.len(), 2);
//! # Ok::<(), docxconv::Error>(())
//! ```

pub mod convert;
pub mod docx;
pub mod dom;
pub mod error;
pub mod export;
pub mod markdown;
pub mod media;
pub(crate) mod util;

pub use convert::{Conversion, ConversionReport, ConvertOptions, Converter, convert_parts};
pub use docx::{DocxPackage, Footnotes, Relationships};
pub use error::{Error, Result};
pub use export::{OutputFormat, RenderConfig};
pub use media::{ImageOptions, ImageStore, JpegImageStore};

/// Convert a `.docx` file into `output_dir` with default options.
pub fn convert_docx(
    input: impl AsRef<std::path::Path>,
    output_dir: impl Into<std::path::PathBuf>,
) -> Result<ConversionReport> {
    Converter::new(ConvertOptions::new(output_dir)).convert_file(input)
}
