//! Conversion pipeline.
//!
//! relationships → footnotes → document body → blockquote join → chapter
//! split → footnote injection, then (for [`Converter::convert_file`]) the
//! chapter files are written.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::docx::{
    DOCUMENT_PART, DocxPackage, FOOTNOTES_PART, Footnotes, RELATIONSHIPS_PART, Relationships,
    extract_footnotes,
};
use crate::dom::parse_xml;
use crate::error::Result;
use crate::export::{OutputFormat, RenderConfig, write_chapters};
use crate::markdown::{MarkupConverter, postprocess};
use crate::media::{ImageOptions, ImageStore, JpegImageStore, MediaResolver};
use crate::util::decode_part;

/// Where and how a conversion writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub output_dir: PathBuf,
    /// Directory under `output_dir` receiving extracted images.
    pub image_subdir_filesystem: String,
    /// Prefix of image references in markup (empty for bare names).
    pub image_subdir_markup: String,
    /// Start a new chapter at every top-level heading.
    pub split_chapters: bool,
    pub images: ImageOptions,
    pub render: RenderConfig,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            image_subdir_filesystem: "images".to_string(),
            image_subdir_markup: "images".to_string(),
            split_chapters: true,
            images: ImageOptions::default(),
            render: RenderConfig::default(),
        }
    }
}

impl ConvertOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_image_dirs(
        mut self,
        filesystem: impl Into<String>,
        markup: impl Into<String>,
    ) -> Self {
        self.image_subdir_filesystem = filesystem.into();
        self.image_subdir_markup = markup.into();
        self
    }

    pub fn with_split_chapters(mut self, split: bool) -> Self {
        self.split_chapters = split;
        self
    }

    pub fn with_images(mut self, images: ImageOptions) -> Self {
        self.images = images;
        self
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.render.format = format;
        self
    }

    /// Directory extracted images are written to.
    pub fn image_dir(&self) -> PathBuf {
        self.output_dir.join(&self.image_subdir_filesystem)
    }
}

/// Result of converting one package, before anything is written.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    /// Markup of the whole body, before postprocessing.
    pub body: String,
    /// Postprocessed chapters; chapter 0 always exists.
    pub chapters: Vec<String>,
    pub footnotes: Footnotes,
    /// Element kinds dropped during conversion, with counts.
    pub dropped: BTreeMap<String, usize>,
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub input: String,
    pub format: OutputFormat,
    /// Files written in the requested format, relative to the output directory.
    pub files: Vec<String>,
    pub chapters: usize,
    pub footnotes: usize,
    /// Image files written.
    pub images: Vec<String>,
    pub dropped_kinds: BTreeMap<String, usize>,
}

/// Serves image requests from the package being converted.
pub struct PackageMedia<'a, R> {
    package: &'a mut DocxPackage<R>,
    store: &'a mut dyn ImageStore,
}

impl<'a, R: Read + Seek> PackageMedia<'a, R> {
    pub fn new(package: &'a mut DocxPackage<R>, store: &'a mut dyn ImageStore) -> Self {
        Self { package, store }
    }
}

impl<R: Read + Seek> MediaResolver for PackageMedia<'_, R> {
    fn insert_image(&mut self, part_name: &str) -> Result<String> {
        let bytes = self.package.read_part(part_name)?;
        self.store.extract_and_resize(part_name, &bytes)
    }
}

/// Convert already-read package parts.
///
/// `footnotes` is `None` when the package has no footnotes part.
pub fn convert_parts(
    document: &str,
    footnotes: Option<&str>,
    relationships: &str,
    media: &mut dyn MediaResolver,
    split_chapters: bool,
) -> Result<Conversion> {
    let relationships = Relationships::from_xml(relationships)?;
    debug!(count = relationships.len(), "parsed relationships");

    let mut converter = MarkupConverter::new(&relationships, media);

    let footnotes = match footnotes {
        Some(xml) => extract_footnotes(&parse_xml(xml)?, &mut converter)?,
        None => Footnotes::default(),
    };

    let dom = parse_xml(document)?;
    let body = converter.convert(&dom, dom.document())?;
    let dropped = converter.into_dropped();
    if !dropped.is_empty() {
        debug!(?dropped, "dropped unhandled elements");
    }

    let chapters = postprocess(&body, &footnotes, split_chapters);

    Ok(Conversion {
        body,
        chapters,
        footnotes,
        dropped,
    })
}

/// Runs conversions with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a package, storing its images in `images`.
    pub fn convert_package<R: Read + Seek>(
        &self,
        package: &mut DocxPackage<R>,
        images: &mut dyn ImageStore,
    ) -> Result<Conversion> {
        let relationships = package.read_part(RELATIONSHIPS_PART)?;
        let footnotes = package.read_optional_part(FOOTNOTES_PART)?;
        let document = package.read_part(DOCUMENT_PART)?;

        let relationships = decode_part(&relationships).into_owned();
        let footnotes = footnotes.map(|bytes| decode_part(&bytes).into_owned());
        let document = decode_part(&document).into_owned();

        let mut media = PackageMedia::new(package, images);
        convert_parts(
            &document,
            footnotes.as_deref(),
            &relationships,
            &mut media,
            self.options.split_chapters,
        )
    }

    /// Convert a `.docx` file and write the chapter files.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<ConversionReport> {
        let path = path.as_ref();
        let options = &self.options;

        let image_dir = options.image_dir();
        fs::create_dir_all(&image_dir)?;

        let mut package = DocxPackage::open(path)?;
        let mut store = JpegImageStore::new(image_dir, options.image_subdir_markup.clone())
            .with_options(options.images);

        let conversion = self.convert_package(&mut package, &mut store)?;
        let files = write_chapters(
            &options.output_dir,
            &conversion.chapters,
            &options.render,
            options.split_chapters,
        )?;

        let images = store
            .written()
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        info!(
            input = %path.display(),
            chapters = conversion.chapters.len(),
            files = files.len(),
            "conversion finished"
        );

        Ok(ConversionReport {
            input: path.display().to_string(),
            format: options.render.format,
            files,
            chapters: conversion.chapters.len(),
            footnotes: conversion.footnotes.len(),
            images,
            dropped_kinds: conversion.dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FixedMedia;

    impl MediaResolver for FixedMedia {
        fn insert_image(&mut self, part_name: &str) -> Result<String> {
            Ok(format!("img/{}", crate::media::output_file_name(part_name)))
        }
    }

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn test_convert_parts_end_to_end() {
        let document = format!(
            r#"<w:document {W}><w:body>
<w:p><w:r><w:t>Preface</w:t></w:r></w:p>
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>
<w:p><w:r><w:t>Body</w:t></w:r><w:r><w:footnoteReference w:id="1"/></w:r></w:p>
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Next</w:t></w:r></w:p>
</w:body></w:document>"#
        );
        let footnotes = format!(
            r#"<w:footnotes {W}><w:footnote w:id="0"><w:p/></w:footnote><w:footnote w:id="1"><w:p><w:r><w:t>Note</w:t></w:r></w:p></w:footnote></w:footnotes>"#
        );

        let conversion = convert_parts(
            &document,
            Some(&footnotes),
            "<Relationships/>",
            &mut FixedMedia,
            true,
        )
        .unwrap();

        assert_eq!(
            conversion.body,
            "Preface\n\n# Intro\n\nBody[^1]\n\n# Next\n\n"
        );
        assert_eq!(conversion.chapters.len(), 3);
        assert_eq!(conversion.chapters[0], "Preface\n\n\n\n");
        assert_eq!(
            conversion.chapters[1],
            "# Intro\n\nBody[^1]\n\n\n\n[^1]: Note\n\n"
        );
        assert_eq!(conversion.chapters[2], "# Next\n\n\n");
        assert_eq!(conversion.footnotes.len(), 1);
    }

    #[test]
    fn test_convert_parts_without_footnotes() {
        let document = format!(r#"<w:document {W}><w:body><w:p><w:r><w:t>x</w:t></w:r></w:p></w:body></w:document>"#);
        let conversion =
            convert_parts(&document, None, "<Relationships/>", &mut FixedMedia, false).unwrap();
        assert_eq!(conversion.chapters, vec!["x\n\n"]);
        assert!(conversion.footnotes.is_empty());
    }

    #[test]
    fn test_missing_image_relationship_aborts() {
        let document = format!(
            r#"<w:document {W} xmlns:a="urn:a" xmlns:r="urn:r"><w:body><w:p><w:r><w:drawing><a:blip r:embed="rId1"/></w:drawing></w:r></w:p></w:body></w:document>"#
        );
        let result = convert_parts(&document, None, "<Relationships/>", &mut FixedMedia, true);
        assert!(matches!(result, Err(Error::MissingReference(ref id)) if id == "rId1"));
    }

    #[test]
    fn test_options_builders() {
        let options = ConvertOptions::new("/tmp/out")
            .with_image_dirs("media", "")
            .with_split_chapters(false)
            .with_format(OutputFormat::Latex);
        assert_eq!(options.image_dir(), PathBuf::from("/tmp/out/media"));
        assert_eq!(options.image_subdir_markup, "");
        assert!(!options.split_chapters);
        assert_eq!(options.render.format, OutputFormat::Latex);
    }
}
