//! Relationship resolution (`word/_rels/document.xml.rels`).

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::dom::{XmlDom, parse_xml};
use crate::error::{Error, Result};

/// Directory that relative relationship targets of the main document part
/// are resolved against.
const DOCUMENT_DIR: &str = "word";

/// Relationship identifier → target path mapping for one document part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    targets: HashMap<String, String>,
}

impl Relationships {
    /// Parse a relationships part.
    pub fn from_xml(content: &str) -> Result<Self> {
        let dom = parse_xml(content)?;
        Self::from_dom(&dom)
    }

    /// Build the mapping from every element child of the root.
    ///
    /// Each relation must carry both `Id` and `Target`; duplicated ids keep
    /// the last target seen.
    pub fn from_dom(dom: &XmlDom) -> Result<Self> {
        let mut targets = HashMap::new();

        let Some(root) = dom.root_element() else {
            return Ok(Self { targets });
        };

        for rel in dom.children(root).filter(|&id| dom.is_element(id)) {
            let element = dom.element_name(rel).unwrap_or("Relationship");
            let id = dom
                .attr(rel, "Id")
                .ok_or_else(|| Error::missing_attribute(element, "Id"))?;
            let target = dom
                .attr(rel, "Target")
                .ok_or_else(|| Error::missing_attribute(element, "Target"))?;
            targets.insert(id.to_string(), target.to_string());
        }

        Ok(Self { targets })
    }

    /// Target of a relationship, as written in the part.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(String::as_str)
    }

    /// Resolve a relationship to the package-internal part name of its target.
    pub fn part_name(&self, id: &str) -> Option<String> {
        self.get(id).map(resolve_target)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Resolve a relationship target to a package part name.
///
/// Relative targets are joined to `word/`; targets starting with `/` are
/// package-absolute. `..` segments are collapsed and `%XX` escapes decoded.
pub fn resolve_target(target: &str) -> String {
    let decoded = percent_decode_str(target).decode_utf8_lossy();

    let joined = match decoded.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{DOCUMENT_DIR}/{decoded}"),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    segments.join("/")
}
