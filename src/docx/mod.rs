//! WordprocessingML package access.
//!
//! - [`DocxPackage`]: the ZIP container and its fixed part names
//! - [`Relationships`]: relationship id → target resolution
//! - [`Footnotes`]: the converted footnote table

mod footnotes;
mod package;
mod relationships;

pub use footnotes::{Footnotes, extract_footnotes};
pub use package::{DOCUMENT_PART, DocxPackage, FOOTNOTES_PART, RELATIONSHIPS_PART};
pub use relationships::{Relationships, resolve_target};
