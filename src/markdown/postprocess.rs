//! Text passes over the converted markup.
//!
//! The converter keeps no tree, so everything here works line by line on the
//! flat markup string:
//!
//! 1. [`join_blockquotes`] glues consecutive quote paragraphs together
//! 2. [`split_into_chapters`] starts a new chapter at every `# ` heading
//! 3. [`add_footnote_definitions`] appends the definitions each chapter uses

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::docx::Footnotes;
use crate::util::split_lines;

static FOOTNOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^(.+?)\]").expect("valid footnote marker pattern"));

const QUOTE_PREFIX: &str = "> ";
const CHAPTER_PREFIX: &str = "# ";

/// Run all passes: blockquote join, chapter split, footnote injection.
///
/// With `split_chapters` off the whole document is a single chapter.
pub fn postprocess(content: &str, footnotes: &Footnotes, split_chapters: bool) -> Vec<String> {
    let joined = join_blockquotes(content);

    let mut chapters = if split_chapters {
        split_into_chapters(&joined)
    } else {
        vec![joined]
    };

    for chapter in &mut chapters {
        add_footnote_definitions(chapter, footnotes);
    }
    chapters
}

/// Prefix an extra `>` to every interior line sitting between two quote lines.
///
/// Neighbours are looked up in the input, so a run of marked lines does not
/// cascade. The first and last line never change.
pub fn join_blockquotes(content: &str) -> String {
    let lines = split_lines(content);
    let mut out = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let quoted_around = i > 0
            && i + 1 < lines.len()
            && lines[i - 1].starts_with(QUOTE_PREFIX)
            && lines[i + 1].starts_with(QUOTE_PREFIX);

        if quoted_around {
            out.push(format!(">{line}"));
        } else {
            out.push((*line).to_string());
        }
    }

    out.join("\n")
}

/// Split markup into chapters at lines starting with `# `.
///
/// Chapter 0 holds whatever precedes the first heading and always exists.
/// Only the heading line opens the new chapter; every other line stays in
/// the current one. Every line keeps a trailing newline.
pub fn split_into_chapters(content: &str) -> Vec<String> {
    let mut chapters = vec![String::new()];

    for line in split_lines(content) {
        if line.starts_with(CHAPTER_PREFIX) {
            chapters.push(String::new());
        }
        if let Some(current) = chapters.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }

    chapters
}

/// Distinct footnote ids referenced in `text`, in order of first appearance.
pub fn footnote_ids(text: &str) -> Vec<&str> {
    let mut ids: Vec<&str> = Vec::new();
    for caps in FOOTNOTE_MARKER.captures_iter(text) {
        let Some(id) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Append `[^id]: definition` for every footnote referenced in the chapter.
///
/// Unknown ids get an empty definition.
pub fn add_footnote_definitions(chapter: &mut String, footnotes: &Footnotes) {
    let definitions: String = footnote_ids(chapter)
        .into_iter()
        .map(|id| format!("[^{id}]: {}\n\n", footnotes.get(id).unwrap_or("")))
        .collect();

    chapter.push_str("\n\n");
    chapter.push_str(&definitions);
}
