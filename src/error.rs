//! Error types for docxconv operations.

use thiserror::Error;

/// Errors that can occur while converting a docx package.
///
/// Every error is terminal for the conversion that raised it; callers may
/// retry the whole conversion from scratch.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A required package entry could not be found.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A relation or reference node lacks an expected attribute.
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// An embedded resource could not be resolved.
    #[error("Unresolved reference: {0}")]
    MissingReference(String),
}

impl Error {
    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
