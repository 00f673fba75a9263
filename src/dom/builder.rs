//! quick-xml event loop that builds an [`XmlDom`].

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;
use crate::util::{local_name, resolve_entity};

use super::arena::{Attribute, XmlDom, XmlNodeId};

/// Elements whose whitespace-only character data is content.
const PRESERVE_WHITESPACE: &[&str] = &["t", "delText", "instrText"];

/// Parse an XML part into a DOM.
///
/// Whitespace-only character data is dropped unless it sits directly inside
/// a text element, so a pretty-printed run still has its properties as its
/// first child.
pub fn parse_xml(content: &str) -> Result<XmlDom> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut dom = XmlDom::new();
    let mut stack: Vec<XmlNodeId> = vec![dom.document()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let id = create_element(&mut dom, &e)?;
                append_to_top(&mut dom, &stack, id);
                stack.push(id);
            }
            Event::Empty(e) => {
                let id = create_element(&mut dom, &e)?;
                append_to_top(&mut dom, &stack, id);
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut dom, &stack, &raw);
            }
            Event::CData(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut dom, &stack, &raw);
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    push_text(&mut dom, &stack, &resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(dom)
}

fn create_element(dom: &mut XmlDom, e: &BytesStart<'_>) -> Result<XmlNodeId> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let raw = String::from_utf8(attr.value.to_vec())?;
        attrs.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: unescape(&raw)?.into_owned(),
        });
    }

    Ok(dom.create_element(name, attrs))
}

fn append_to_top(dom: &mut XmlDom, stack: &[XmlNodeId], id: XmlNodeId) {
    if let Some(&parent) = stack.last() {
        dom.append(parent, id);
    }
}

fn push_text(dom: &mut XmlDom, stack: &[XmlNodeId], text: &str) {
    let Some(&parent) = stack.last() else {
        return;
    };

    if text.trim().is_empty() {
        let keep = dom
            .element_name(parent)
            .is_some_and(|name| PRESERVE_WHITESPACE.contains(&local_name(name)));
        if !keep {
            return;
        }
    }

    dom.append_text(parent, text);
}
