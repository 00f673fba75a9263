//! Markup → LaTeX through a `pulldown-cmark` event walker.

use std::collections::HashMap;
use std::mem;

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd, TextMergeStream};

use super::dialect::{AttributeHandling, bridge};
use super::html::engine_options;
use super::{MarkupRenderer, RenderConfig};

/// Renders chapter markup as a LaTeX body fragment.
#[derive(Debug, Clone, Default)]
pub struct LatexRenderer {
    config: RenderConfig,
}

impl LatexRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl MarkupRenderer for LatexRenderer {
    fn render(&self, markup: &str) -> String {
        let source = bridge(markup, AttributeHandling::Drop);
        let parser = TextMergeStream::new(Parser::new_ext(&source, engine_options()));

        let mut writer = LatexWriter::new(self.config.line_width);
        for event in parser {
            writer.event(event);
        }
        writer.finish()
    }

    fn extension(&self) -> &'static str {
        "tex"
    }
}

/// Escape LaTeX special characters.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

fn heading_command(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "section",
        HeadingLevel::H2 => "subsection",
        HeadingLevel::H3 => "subsubsection",
        HeadingLevel::H4 => "paragraph",
        HeadingLevel::H5 | HeadingLevel::H6 => "subparagraph",
    }
}

fn footnote_placeholder(label: &str) -> String {
    format!("\u{0}footnote:{label}\u{0}")
}

struct LatexWriter {
    out: String,
    line_width: usize,
    column: usize,
    in_code_block: bool,
    image_depth: usize,
    cell_index: usize,
    head_start: Option<usize>,
    footnote_stack: Vec<(String, String)>,
    footnotes: HashMap<String, String>,
    referenced: Vec<String>,
}

impl LatexWriter {
    fn new(line_width: usize) -> Self {
        Self {
            out: String::new(),
            line_width,
            column: 0,
            in_code_block: false,
            image_depth: 0,
            cell_index: 0,
            head_start: None,
            footnote_stack: Vec::new(),
            footnotes: HashMap::new(),
            referenced: Vec::new(),
        }
    }

    fn write(&mut self, s: &str) {
        self.out.push_str(s);
        match s.rfind('\n') {
            Some(pos) => self.column = s[pos + 1..].chars().count(),
            None => self.column += s.chars().count(),
        }
    }

    /// Write prose, breaking lines at spaces once `line_width` is reached.
    fn write_wrapped(&mut self, text: &str) {
        if self.line_width == 0 {
            self.write(text);
            return;
        }

        let mut first = true;
        for word in text.split(' ') {
            let len = word.chars().count();
            if !first {
                if self.column > 0 && self.column + 1 + len > self.line_width {
                    self.write("\n");
                } else {
                    self.write(" ");
                }
            }
            self.write(word);
            first = false;
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if self.image_depth > 0 {
                    return;
                }
                if self.in_code_block {
                    self.write(&text);
                } else {
                    self.write_wrapped(&escape_latex(&text));
                }
            }
            Event::Code(code) => {
                self.write("\\texttt{");
                self.write(&escape_latex(&code));
                self.write("}");
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if html.contains("page-break") {
                    self.write("\\newpage\n");
                }
            }
            Event::FootnoteReference(label) => {
                self.referenced.push(label.to_string());
                let placeholder = footnote_placeholder(&label);
                self.write(&placeholder);
            }
            Event::SoftBreak => self.write("\n"),
            Event::HardBreak => self.write("\\\\\n"),
            Event::Rule => self.write("\\begin{center}\\rule{3in}{0.4pt}\\end{center}\n\n"),
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.write("\\");
                self.write(heading_command(level));
                self.write("{");
            }
            Tag::BlockQuote(_) => self.write("\\begin{quote}\n"),
            Tag::CodeBlock(_) => {
                self.in_code_block = true;
                self.write("\\begin{verbatim}\n");
            }
            Tag::List(Some(_)) => self.write("\\begin{enumerate}\n"),
            Tag::List(None) => self.write("\\begin{itemize}\n"),
            Tag::Item => self.write("\\item "),
            Tag::FootnoteDefinition(label) => {
                let saved = mem::take(&mut self.out);
                self.footnote_stack.push((label.to_string(), saved));
                self.column = 0;
            }
            Tag::Table(alignments) => {
                self.write("\\begin{tabular}{");
                self.write(&"l".repeat(alignments.len().max(1)));
                self.write("}\n");
            }
            Tag::TableHead => {
                self.head_start = Some(self.out.len());
                self.cell_index = 0;
            }
            Tag::TableRow => self.cell_index = 0,
            Tag::TableCell => {
                if self.cell_index > 0 {
                    self.write(" & ");
                }
                self.cell_index += 1;
            }
            Tag::Emphasis => self.write("\\emph{"),
            Tag::Strong => self.write("\\textbf{"),
            Tag::Strikethrough => self.write("\\sout{"),
            Tag::Link { dest_url, .. } => {
                self.write("\\href{");
                self.write(&escape_latex(&dest_url));
                self.write("}{");
            }
            Tag::Image { dest_url, .. } => {
                self.write("\\includegraphics{");
                self.write(&dest_url);
                self.write("}");
                self.image_depth += 1;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.write("\n\n"),
            TagEnd::Heading(_) => self.write("}\n\n"),
            TagEnd::BlockQuote(_) => self.write("\\end{quote}\n\n"),
            TagEnd::CodeBlock => {
                if self.in_code_block {
                    self.in_code_block = false;
                    if !self.out.ends_with('\n') {
                        self.write("\n");
                    }
                    self.write("\\end{verbatim}\n\n");
                }
            }
            TagEnd::List(true) => self.write("\\end{enumerate}\n\n"),
            TagEnd::List(false) => self.write("\\end{itemize}\n\n"),
            TagEnd::Item => {
                if !self.out.ends_with('\n') {
                    self.write("\n");
                }
            }
            TagEnd::FootnoteDefinition => {
                if let Some((label, saved)) = self.footnote_stack.pop() {
                    let definition = mem::replace(&mut self.out, saved);
                    self.footnotes.insert(label, definition.trim().to_string());
                    self.column = 0;
                }
            }
            TagEnd::TableHead => {
                if let Some(start) = self.head_start.take() {
                    let head = &self.out[start..];
                    if head.chars().all(|c| c == '&' || c.is_whitespace()) {
                        self.out.truncate(start);
                    } else {
                        self.write(" \\\\\n\\hline\n");
                    }
                }
            }
            TagEnd::TableRow => self.write(" \\\\\n"),
            TagEnd::Table => self.write("\\end{tabular}\n\n"),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.write("}");
            }
            TagEnd::Image => self.image_depth = self.image_depth.saturating_sub(1),
            _ => {}
        }
    }

    /// Inline collected footnote definitions at their reference points.
    fn finish(self) -> String {
        let mut out = self.out;
        for label in &self.referenced {
            let placeholder = footnote_placeholder(label);
            let definition = self.footnotes.get(label).map(String::as_str).unwrap_or("");
            out = out.replacen(&placeholder, &format!("\\footnote{{{definition}}}"), 1);
        }
        out.trim_end().to_string() + "\n"
    }
}
