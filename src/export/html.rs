//! Markup → HTML via `pulldown-cmark`.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream, html};

use super::dialect::{AttributeHandling, bridge, marker_classes};
use super::{MarkupRenderer, RenderConfig};

/// Empty table head left behind once the synthetic header cells are removed.
const EMPTY_TABLE_HEAD: &str = "<thead><tr></tr></thead>";

/// Renders chapter markup as an HTML fragment.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    config: RenderConfig,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

impl MarkupRenderer for HtmlRenderer {
    fn render(&self, markup: &str) -> String {
        let source = bridge(markup, AttributeHandling::Mark);
        let parser = TextMergeStream::new(Parser::new_ext(&source, engine_options()));
        let events = apply_classes(drop_empty_table_heads(parser.collect()));

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out.replace(EMPTY_TABLE_HEAD, "")
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

pub(crate) fn engine_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH
}

/// Move classes from marker comments onto the block that follows them.
fn apply_classes(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out: Vec<Event<'_>> = Vec::with_capacity(events.len());
    let mut pending: Option<String> = None;
    let mut in_marker_block = false;
    let mut classed_paragraph = false;

    for event in events {
        match event {
            Event::Html(ref text) if marker_classes(text).is_some() => {
                pending = marker_classes(text).map(str::to_string);
                if matches!(out.last(), Some(Event::Start(Tag::HtmlBlock))) {
                    out.pop();
                    in_marker_block = true;
                }
            }
            Event::End(TagEnd::HtmlBlock) if in_marker_block => {
                in_marker_block = false;
            }
            Event::Start(Tag::Heading {
                level,
                id,
                mut classes,
                attrs,
            }) => {
                if let Some(names) = pending.take() {
                    classes.extend(names.split_whitespace().map(|c| CowStr::from(c.to_string())));
                }
                out.push(Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }));
            }
            Event::Start(Tag::Paragraph) if pending.is_some() => {
                let names = pending.take().unwrap_or_default();
                out.push(Event::Html(format!("<p class=\"{names}\">").into()));
                classed_paragraph = true;
            }
            Event::End(TagEnd::Paragraph) if classed_paragraph => {
                out.push(Event::Html("</p>\n".into()));
                classed_paragraph = false;
            }
            Event::Start(tag) => {
                pending = None;
                out.push(Event::Start(tag));
            }
            other => out.push(other),
        }
    }

    out
}

/// Remove the cells of table heads that hold no content.
fn drop_empty_table_heads(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut head: Option<Vec<Event<'_>>> = None;

    for event in events {
        match event {
            Event::Start(Tag::TableHead) => {
                out.push(event);
                head = Some(Vec::new());
            }
            Event::End(TagEnd::TableHead) => {
                if let Some(cells) = head.take() {
                    let has_content = cells.iter().any(|e| {
                        !matches!(
                            e,
                            Event::Start(Tag::TableCell) | Event::End(TagEnd::TableCell)
                        )
                    });
                    if has_content {
                        out.extend(cells);
                    }
                }
                out.push(event);
            }
            other => match head.as_mut() {
                Some(cells) => cells.push(other),
                None => out.push(other),
            },
        }
    }

    out
}
