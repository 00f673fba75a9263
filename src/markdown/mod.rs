//! Kramdown-style markup generation.
//!
//! - [`convert`]: document tree → flat markup string
//! - [`postprocess`]: blockquote join, chapter split and footnote injection
//!
//! Both halves work on plain strings. No intermediate tree survives the
//! conversion, so the postprocessing passes match on text patterns.

mod convert;
mod postprocess;

pub use convert::{
    LINE_BREAK, MarkupConverter, PAGE_BREAK, TITLE_ATTRIBUTE, paragraph_style_prefix,
    run_delimiters,
};
pub use postprocess::{
    add_footnote_definitions, footnote_ids, join_blockquotes, postprocess, split_into_chapters,
};
