//! Document tree → kramdown-style markup.
//!
//! The walk is a shallow dispatch over [`NodeKind`]: every child of the node
//! being converted is classified and either emits text, recurses, or is
//! dropped together with its whole subtree. Formatting of a run is decided by
//! looking at the run's first child only (and, for run properties, at their
//! first child), since the source format does not nest inline formatting.

use std::collections::BTreeMap;

use tracing::trace;

use crate::docx::Relationships;
use crate::dom::{NodeKind, XmlDom, XmlNodeId};
use crate::error::{Error, Result};
use crate::media::MediaResolver;

/// Hard line break: two spaces then a newline.
pub const LINE_BREAK: &str = "  \n";

/// Raw HTML emitted for a page break.
pub const PAGE_BREAK: &str = "<br style='page-break-before:always;'>";

/// Block attribute line marking the following block as a title.
pub const TITLE_ATTRIBUTE: &str = "{: .class = 'title' }";

const TITLE_PREFIX: &str = "{: .class = 'title' }\n# ";

/// Qualified name of a WordprocessingML paragraph. DrawingML shapes carry
/// their own `a:p` paragraphs, which are not table cells.
const PARAGRAPH_ELEMENT: &str = "w:p";

/// Converts document tree nodes into markup text.
///
/// One converter is used for a whole conversion (footnotes and body), so the
/// dropped-kind tally covers both.
pub struct MarkupConverter<'a> {
    relationships: &'a Relationships,
    media: &'a mut dyn MediaResolver,
    dropped: BTreeMap<String, usize>,
}

impl<'a> MarkupConverter<'a> {
    pub fn new(relationships: &'a Relationships, media: &'a mut dyn MediaResolver) -> Self {
        Self {
            relationships,
            media,
            dropped: BTreeMap::new(),
        }
    }

    /// Convert the children of `node`, in order, and concatenate the result.
    pub fn convert(&mut self, dom: &XmlDom, node: XmlNodeId) -> Result<String> {
        let mut out = String::new();
        self.walk_children(dom, node, &mut out)?;
        Ok(out)
    }

    /// Element kinds dropped so far, with how often each was seen.
    pub fn dropped(&self) -> &BTreeMap<String, usize> {
        &self.dropped
    }

    pub fn into_dropped(self) -> BTreeMap<String, usize> {
        self.dropped
    }

    fn walk_children(&mut self, dom: &XmlDom, node: XmlNodeId, out: &mut String) -> Result<()> {
        for child in dom.children(node) {
            self.walk_node(dom, child, out)?;
        }
        Ok(())
    }

    fn walk_node(&mut self, dom: &XmlDom, id: XmlNodeId, out: &mut String) -> Result<()> {
        // Character data only counts when reached through a text element.
        let Some(local) = dom.local_name(id) else {
            return Ok(());
        };

        match NodeKind::classify(local) {
            NodeKind::Container | NodeKind::ParagraphProperties | NodeKind::Table => {
                self.walk_children(dom, id, out)?;
            }
            NodeKind::Paragraph => {
                self.walk_children(dom, id, out)?;
                out.push_str("\n\n");
            }
            NodeKind::ParagraphStyle => {
                out.push_str(paragraph_style_prefix(dom.attr(id, "val")));
            }
            NodeKind::Run => self.walk_run(dom, id, out)?,
            NodeKind::Text => out.push_str(&dom.text_content(id)),
            NodeKind::FootnoteReference => {
                let footnote_id = required_attr(dom, id, "id")?;
                out.push_str("[^");
                out.push_str(footnote_id);
                out.push(']');
            }
            NodeKind::TableRow => self.walk_table_row(dom, id, out)?,
            NodeKind::Drawing => self.walk_drawing(dom, id, out)?,
            NodeKind::RunProperties | NodeKind::Ignorable => {}
            NodeKind::Break | NodeKind::Other => {
                trace!(kind = local, "dropping unhandled node");
                *self.dropped.entry(local.to_string()).or_insert(0) += 1;
            }
        }

        Ok(())
    }

    fn walk_run(&mut self, dom: &XmlDom, run: XmlNodeId, out: &mut String) -> Result<()> {
        let Some(first) = dom.first_child(run) else {
            return Ok(());
        };

        match dom.local_name(first).map(NodeKind::classify) {
            Some(NodeKind::RunProperties) => {
                let (prefix, postfix) = dom
                    .first_child(first)
                    .map(|format| run_delimiters(dom, format))
                    .unwrap_or(("", ""));
                out.push_str(prefix);
                self.walk_children(dom, run, out)?;
                out.push_str(postfix);
            }
            Some(NodeKind::Break) => {
                if dom.attr(first, "type") == Some("page") {
                    out.push_str(PAGE_BREAK);
                } else {
                    out.push_str(LINE_BREAK);
                }
            }
            _ => self.walk_children(dom, run, out)?,
        }

        Ok(())
    }

    /// `|cell|cell|\n`, one cell per `w:p` found anywhere below the row.
    fn walk_table_row(&mut self, dom: &XmlDom, row: XmlNodeId, out: &mut String) -> Result<()> {
        let paragraphs: Vec<XmlNodeId> = dom
            .descendants(row)
            .filter(|&id| dom.element_name(id) == Some(PARAGRAPH_ELEMENT))
            .collect();

        let mut cells = Vec::with_capacity(paragraphs.len());
        for paragraph in paragraphs {
            cells.push(self.convert(dom, paragraph)?);
        }

        out.push('|');
        out.push_str(&cells.join("|"));
        out.push_str("|\n");
        Ok(())
    }

    fn walk_drawing(&mut self, dom: &XmlDom, drawing: XmlNodeId, out: &mut String) -> Result<()> {
        let blip = dom.find_descendant(drawing, "blip").ok_or_else(|| {
            Error::MissingReference("drawing without an image reference".to_string())
        })?;
        let embed = required_attr(dom, blip, "embed")?;
        let part_name = self
            .relationships
            .part_name(embed)
            .ok_or_else(|| Error::MissingReference(embed.to_string()))?;

        let reference = self.media.insert_image(&part_name)?;
        out.push_str("![](");
        out.push_str(&reference);
        out.push_str(")\n");
        Ok(())
    }
}

/// Prefix emitted for a paragraph style reference.
pub fn paragraph_style_prefix(style: Option<&str>) -> &'static str {
    match style {
        Some("Title") => TITLE_PREFIX,
        Some("Heading1") => "# ",
        Some("Heading2") => "## ",
        Some("Quote") => "> ",
        _ => "",
    }
}

/// Prefix and postfix for a run, given the first child of its properties.
pub fn run_delimiters(dom: &XmlDom, format: XmlNodeId) -> (&'static str, &'static str) {
    match dom.local_name(format) {
        Some("b") => ("**", "**"),
        Some("i") => ("*", "*"),
        Some("smallCaps") => (" name(", ")"),
        // Character styles carry no whitespace preservation, hence the padding.
        Some("rStyle") => match dom.attr(format, "val") {
            Some("Strong") => (" **", "** "),
            Some(name) if name.contains("Emph") => (" *", "* "),
            _ => ("", ""),
        },
        _ => ("", ""),
    }
}

fn required_attr<'d>(dom: &'d XmlDom, id: XmlNodeId, attribute: &str) -> Result<&'d str> {
    dom.attr(id, attribute)
        .ok_or_else(|| Error::missing_attribute(dom.element_name(id).unwrap_or("?"), attribute))
}
