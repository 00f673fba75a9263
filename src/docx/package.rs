//! ZIP access to a docx package.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

/// Main document body part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Footnotes part (optional).
pub const FOOTNOTES_PART: &str = "word/footnotes.xml";

/// Relationships of the main document part.
pub const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";

/// An open docx package.
///
/// Owns the archive handle; it is released when the package is dropped.
pub struct DocxPackage<R> {
    archive: ZipArchive<R>,
}

impl DocxPackage<BufReader<File>> {
    /// Open a package from the filesystem.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> DocxPackage<R> {
    /// Open a package from any seekable reader (a file, a `Cursor<Vec<u8>>`, ...).
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Read a required part.
    ///
    /// Fails with [`Error::MissingPart`] when the entry does not exist.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>> {
        self.read_optional_part(name)?
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Read a part that may legitimately be absent.
    pub fn read_optional_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                debug!(part = name, "package part not present");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        debug!(part = name, bytes = data.len(), "read package part");
        Ok(Some(data))
    }

    /// Check whether the package contains a part.
    pub fn has_part(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Names of all entries in the package.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn package(entries: &[(&str, &str)]) -> DocxPackage<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let cursor = writer.finish().unwrap();
        DocxPackage::from_reader(Cursor::new(cursor.into_inner())).unwrap()
    }

    #[test]
    fn test_read_part() {
        let mut pkg = package(&[(DOCUMENT_PART, "<w:document/>")]);
        assert_eq!(pkg.read_part(DOCUMENT_PART).unwrap(), b"<w:document/>");
        assert!(pkg.has_part(DOCUMENT_PART));
        assert_eq!(pkg.part_names().count(), 1);
    }

    #[test]
    fn test_missing_required_part() {
        let mut pkg = package(&[(DOCUMENT_PART, "<w:document/>")]);
        let err = pkg.read_part(RELATIONSHIPS_PART).unwrap_err();
        assert!(matches!(err, Error::MissingPart(ref name) if name == RELATIONSHIPS_PART));
    }

    #[test]
    fn test_missing_optional_part() {
        let mut pkg = package(&[(DOCUMENT_PART, "<w:document/>")]);
        assert!(pkg.read_optional_part(FOOTNOTES_PART).unwrap().is_none());
        assert!(!pkg.has_part(FOOTNOTES_PART));
    }

    #[test]
    fn test_not_a_zip() {
        let result = DocxPackage::from_reader(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(Error::Zip(_))));
    }
}
