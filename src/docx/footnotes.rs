//! Footnote table built from `word/footnotes.xml`.

use std::collections::HashMap;

use tracing::debug;

use crate::dom::XmlDom;
use crate::error::{Error, Result};
use crate::markdown::MarkupConverter;

/// Ids Word reserves for its separator pseudo-footnotes.
const RESERVED_IDS: &[&str] = &["-1", "0"];

/// Footnote id → converted, trimmed markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footnotes {
    entries: HashMap<String, String>,
}

impl Footnotes {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Insert a definition, ignoring the reserved ids.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) -> bool {
        let id = id.into();
        if is_reserved(&id) {
            return false;
        }
        self.entries.insert(id, text.into());
        true
    }
}

impl FromIterator<(String, String)> for Footnotes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut footnotes = Footnotes::default();
        for (id, text) in iter {
            footnotes.insert(id, text);
        }
        footnotes
    }
}

fn is_reserved(id: &str) -> bool {
    RESERVED_IDS.contains(&id)
}

/// Convert every `footnote` element of a footnotes part.
///
/// An empty document gives an empty table.
pub fn extract_footnotes(dom: &XmlDom, converter: &mut MarkupConverter<'_>) -> Result<Footnotes> {
    let mut footnotes = Footnotes::default();

    let nodes: Vec<_> = dom
        .descendants(dom.document())
        .filter(|&id| dom.local_name(id) == Some("footnote"))
        .collect();

    for node in nodes {
        let id = dom.attr(node, "id").ok_or_else(|| {
            Error::missing_attribute(dom.element_name(node).unwrap_or("footnote"), "id")
        })?;
        if is_reserved(id) {
            continue;
        }

        let text = converter.convert(dom, node)?;
        footnotes.insert(id, text.trim());
    }

    debug!(count = footnotes.len(), "extracted footnotes");
    Ok(footnotes)
}
