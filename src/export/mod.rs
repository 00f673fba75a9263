//! Writing chapters to disk.
//!
//! Every chapter is always written as raw markup (`.page`). HTML and LaTeX
//! output is produced from that markup by a [`MarkupRenderer`]:
//!
//! - [`HtmlRenderer`]: `pulldown-cmark`'s HTML writer
//! - [`LatexRenderer`]: an event walker over the same parser
//!
//! Renderers follow a builder pattern: `new()` for defaults and
//! `with_config()` for a custom [`RenderConfig`].

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

mod dialect;
mod html;
mod latex;

pub use dialect::{AttributeHandling, attribute_classes, bridge, trailing_attribute};
pub use html::HtmlRenderer;
pub use latex::{LatexRenderer, escape_latex};

/// Extension of raw markup chapter files.
pub const MARKUP_EXTENSION: &str = "page";

/// Line width hint that effectively disables wrapping.
pub const DEFAULT_LINE_WIDTH: usize = 100_000;

/// Output format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raw kramdown-style markup only.
    #[default]
    Markup,
    Html,
    Latex,
}

impl OutputFormat {
    /// File extension of the format's chapter files.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markup => MARKUP_EXTENSION,
            OutputFormat::Html => "html",
            OutputFormat::Latex => "tex",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markup" | "kramdown" | "page" => Ok(OutputFormat::Markup),
            "html" => Ok(OutputFormat::Html),
            "latex" | "tex" => Ok(OutputFormat::Latex),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Markup => "markup",
            OutputFormat::Html => "html",
            OutputFormat::Latex => "latex",
        };
        f.write_str(name)
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub format: OutputFormat,
    /// Language tag embedded in chapter file names.
    pub language: String,
    /// Wrap rendered prose at this many columns (0 = never).
    pub line_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markup,
            language: "en".to_string(),
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl RenderConfig {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }
}

/// Turns chapter markup into a target format.
pub trait MarkupRenderer {
    fn render(&self, markup: &str) -> String;

    /// Extension of the rendered files.
    fn extension(&self) -> &'static str;
}

/// Renderer for `config.format`, or `None` for raw markup.
pub fn renderer_for(config: &RenderConfig) -> Option<Box<dyn MarkupRenderer>> {
    match config.format {
        OutputFormat::Markup => None,
        OutputFormat::Html => Some(Box::new(HtmlRenderer::with_config(config.clone()))),
        OutputFormat::Latex => Some(Box::new(LatexRenderer::with_config(config.clone()))),
    }
}

/// Markup file name of a chapter.
///
/// `Some(n)` gives `NN.chapterNN.<lang>.page`; `None` (no chapter
/// splitting) gives `01.chapter01.<lang>.page`.
pub fn chapter_file_name(index: Option<usize>, language: &str) -> String {
    let n = index.unwrap_or(1);
    format!("{n:02}.chapter{n:02}.{language}.{MARKUP_EXTENSION}")
}

/// Swap the `.page` extension of a chapter file name.
pub fn with_extension(file_name: &str, extension: &str) -> String {
    match file_name.strip_suffix(MARKUP_EXTENSION) {
        Some(stem) => format!("{stem}{extension}"),
        None => format!("{file_name}.{extension}"),
    }
}

/// Write chapters into `dir` and return the names of the files in the
/// requested format.
///
/// Without chapter splitting only the first chapter is written. A block
/// attribute line ending one chapter is applied to the heading opening the
/// next one when rendering; the markup files are written unchanged.
pub fn write_chapters(
    dir: &Path,
    chapters: &[String],
    config: &RenderConfig,
    split_chapters: bool,
) -> Result<Vec<String>> {
    let renderer = renderer_for(config);
    let mut written = Vec::new();

    let selected: Vec<(Option<usize>, &String)> = if split_chapters {
        chapters.iter().enumerate().map(|(n, c)| (Some(n), c)).collect()
    } else {
        chapters.first().map(|c| (None, c)).into_iter().collect()
    };

    let mut carried: Option<&str> = None;
    for (index, markup) in selected {
        let markup_name = chapter_file_name(index, &config.language);
        fs::write(dir.join(&markup_name), markup)?;
        debug!(file = %markup_name, "wrote chapter markup");

        match &renderer {
            Some(renderer) => {
                let name = with_extension(&markup_name, renderer.extension());
                let rendered = match carried {
                    Some(attribute) => renderer.render(&format!("{attribute}\n{markup}")),
                    None => renderer.render(markup),
                };
                fs::write(dir.join(&name), rendered)?;
                debug!(file = %name, "wrote rendered chapter");
                written.push(name);
            }
            None => written.push(markup_name),
        }
        carried = trailing_attribute(markup);
    }

    Ok(written)
}
