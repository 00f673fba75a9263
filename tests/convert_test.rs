//! End-to-end conversion tests.
//!
//! Packages are assembled in memory with `zip::ZipWriter`, written to a temp
//! directory and converted through the public API.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use docxconv::{ConvertOptions, Converter, DocxPackage, Error, ImageStore, OutputFormat};

const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;

const FOOTNOTES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:footnotes xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>
  <w:footnote w:type="continuationSeparator" w:id="0"><w:p><w:r><w:continuationSeparator/></w:r></w:p></w:footnote>
  <w:footnote w:id="1"><w:p><w:r><w:footnoteRef/></w:r><w:r><w:t xml:space="preserve"> First source.</w:t></w:r></w:p></w:footnote>
</w:footnotes>"#;

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document {NS}><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

fn paragraph(style: Option<&str>, runs: &str) -> String {
    let props = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!("<w:p>{props}{runs}</w:p>")
}

fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

fn drawing(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="100" cy="100"/><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb([20u8, 120, 220]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn build_docx(parts: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn write_docx(dir: &Path, parts: &[(&str, Vec<u8>)]) -> PathBuf {
    let path = dir.join("input.docx");
    fs::write(&path, build_docx(parts)).unwrap();
    path
}

fn sample_body() -> String {
    [
        paragraph(Some("Title"), &run("The Book")),
        paragraph(None, &run("Opening words.")),
        paragraph(Some("Heading1"), &run("Intro")),
        paragraph(
            None,
            &format!(
                r#"{}<w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r>{}<w:r><w:footnoteReference w:id="1"/></w:r>"#,
                run("Some "),
                run(" text")
            ),
        ),
        paragraph(Some("Quote"), &run("first")),
        paragraph(Some("Quote"), &run("second")),
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#.to_string(),
        paragraph(Some("Heading1"), &run("Pictures")),
        paragraph(None, &drawing("rId4")),
    ]
    .concat()
}

fn sample_parts() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("[Content_Types].xml", b"<Types/>".to_vec()),
        ("word/document.xml", document_xml(&sample_body()).into_bytes()),
        ("word/footnotes.xml", FOOTNOTES.as_bytes().to_vec()),
        ("word/_rels/document.xml.rels", RELS.as_bytes().to_vec()),
        ("word/media/image1.png", png(1200, 900)),
    ]
}

// ============================================================================
// Markup Output
// ============================================================================

#[test]
fn test_convert_file_writes_chapters_and_images() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(dir.path(), &sample_parts());
    let out = dir.path().join("out");

    let report = Converter::new(ConvertOptions::new(&out))
        .convert_file(&input)
        .unwrap();

    assert_eq!(
        report.files,
        vec![
            "00.chapter00.en.page",
            "01.chapter01.en.page",
            "02.chapter02.en.page",
            "03.chapter03.en.page",
        ]
    );
    assert_eq!(report.chapters, 4);
    assert_eq!(report.footnotes, 1);
    assert_eq!(report.images, vec!["image1.jpg"]);
    assert_eq!(report.dropped_kinds.get("sectPr"), Some(&1));

    let image = image::open(out.join("images/image1.jpg")).unwrap();
    assert_eq!((image.width(), image.height()), (800, 600));

    let chapter0 = fs::read_to_string(out.join("00.chapter00.en.page")).unwrap();
    assert_eq!(chapter0, "{: .class = 'title' }\n\n\n");

    let chapter1 = fs::read_to_string(out.join("01.chapter01.en.page")).unwrap();
    assert_eq!(chapter1, "# The Book\n\nOpening words.\n\n\n\n");

    let chapter2 = fs::read_to_string(out.join("02.chapter02.en.page")).unwrap();
    assert_eq!(
        chapter2,
        "# Intro\n\nSome **bold** text[^1]\n\n> first\n>\n> second\n\n|A|B|\n\n\n[^1]: First source.\n\n"
    );

    let chapter3 = fs::read_to_string(out.join("03.chapter03.en.page")).unwrap();
    assert_eq!(chapter3, "# Pictures\n\n![](images/image1.jpg)\n\n\n");
}

#[test]
fn test_convert_without_split_and_bare_image_names() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(dir.path(), &sample_parts());
    let out = dir.path().join("single");

    let options = ConvertOptions::new(&out)
        .with_image_dirs("pics", "")
        .with_split_chapters(false);
    let report = Converter::new(options).convert_file(&input).unwrap();

    assert_eq!(report.files, vec!["01.chapter01.en.page"]);
    assert!(out.join("pics/image1.jpg").exists());

    let markup = fs::read_to_string(out.join("01.chapter01.en.page")).unwrap();
    assert!(markup.starts_with("{: .class = 'title' }\n# The Book\n"));
    assert!(markup.contains("![](image1.jpg)"));
    assert!(markup.ends_with("[^1]: First source.\n\n"));
}

// ============================================================================
// Rendered Output
// ============================================================================

#[test]
fn test_html_output() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(dir.path(), &sample_parts());
    let out = dir.path().join("html");

    let options = ConvertOptions::new(&out).with_format(OutputFormat::Html);
    let report = Converter::new(options).convert_file(&input).unwrap();

    assert_eq!(report.files.len(), 4);
    assert!(report.files.iter().all(|f| f.ends_with(".html")));
    assert!(out.join("02.chapter02.en.page").exists());

    let intro = fs::read_to_string(out.join("02.chapter02.en.html")).unwrap();
    assert!(intro.contains("<h1>Intro</h1>"));
    assert!(intro.contains("<strong>bold</strong>"));
    assert!(intro.contains("<blockquote>"));
    assert!(intro.contains("<td>A</td>"));
    assert!(intro.contains("First source."));

    let title = fs::read_to_string(out.join("01.chapter01.en.html")).unwrap();
    assert!(title.contains(r#"<h1 class="title">The Book</h1>"#));

    let pictures = fs::read_to_string(out.join("03.chapter03.en.html")).unwrap();
    assert!(pictures.contains(r#"<img src="images/image1.jpg""#));
}

#[test]
fn test_latex_output() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(dir.path(), &sample_parts());
    let out = dir.path().join("tex");

    let options = ConvertOptions::new(&out)
        .with_format(OutputFormat::Latex)
        .with_split_chapters(false);
    let report = Converter::new(options).convert_file(&input).unwrap();

    assert_eq!(report.files, vec!["01.chapter01.en.tex"]);
    let tex = fs::read_to_string(out.join("01.chapter01.en.tex")).unwrap();
    assert!(tex.contains("\\section{The Book}"));
    assert!(tex.contains("\\textbf{bold}"));
    assert!(tex.contains("\\footnote{First source.}"));
    assert!(tex.contains("\\begin{quote}"));
    assert!(tex.contains("\\includegraphics{images/image1.jpg}"));
    assert!(!tex.contains("class"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_document_part() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(
        dir.path(),
        &[("word/_rels/document.xml.rels", RELS.as_bytes().to_vec())],
    );

    let err = Converter::new(ConvertOptions::new(dir.path().join("out")))
        .convert_file(&input)
        .unwrap_err();
    assert!(matches!(err, Error::MissingPart(ref part) if part == "word/document.xml"));
}

#[test]
fn test_missing_relationships_part() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(
        dir.path(),
        &[("word/document.xml", document_xml("").into_bytes())],
    );

    let err = Converter::new(ConvertOptions::new(dir.path().join("out")))
        .convert_file(&input)
        .unwrap_err();
    assert!(matches!(err, Error::MissingPart(ref part) if part == "word/_rels/document.xml.rels"));
}

#[test]
fn test_unknown_image_relationship_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let body = paragraph(None, &drawing("rId99"));
    let input = write_docx(
        dir.path(),
        &[
            ("word/document.xml", document_xml(&body).into_bytes()),
            ("word/_rels/document.xml.rels", RELS.as_bytes().to_vec()),
        ],
    );
    let out = dir.path().join("out");

    let err = Converter::new(ConvertOptions::new(&out))
        .convert_file(&input)
        .unwrap_err();
    assert!(matches!(err, Error::MissingReference(ref id) if id == "rId99"));
    assert!(!out.join("00.chapter00.en.page").exists());
}

#[test]
fn test_not_a_docx() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("plain.docx");
    fs::write(&input, "just text").unwrap();

    let err = Converter::new(ConvertOptions::new(dir.path()))
        .convert_file(&input)
        .unwrap_err();
    assert!(matches!(err, Error::Zip(_)));
}

// ============================================================================
// In-memory Packages
// ============================================================================

/// Records image requests instead of touching the filesystem.
#[derive(Default)]
struct RecordingStore {
    parts: Vec<(String, usize)>,
}

impl ImageStore for RecordingStore {
    fn extract_and_resize(&mut self, part_name: &str, bytes: &[u8]) -> docxconv::Result<String> {
        self.parts.push((part_name.to_string(), bytes.len()));
        Ok("stored.jpg".to_string())
    }
}

#[test]
fn test_convert_package_from_memory() {
    let bytes = build_docx(&sample_parts());
    let mut package = DocxPackage::from_reader(Cursor::new(bytes)).unwrap();
    let mut store = RecordingStore::default();

    let conversion = Converter::default()
        .convert_package(&mut package, &mut store)
        .unwrap();

    assert_eq!(store.parts.len(), 1);
    assert_eq!(store.parts[0].0, "word/media/image1.png");
    assert!(store.parts[0].1 > 0);
    assert!(conversion.body.contains("![](stored.jpg)\n"));
    assert_eq!(conversion.footnotes.get("1"), Some("First source."));
}
