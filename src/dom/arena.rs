//! Arena-based DOM for package XML parts.
//!
//! Nodes live in one contiguous vector; parent/child/sibling links are
//! indices into it. The tree is built once by [`super::parse_xml`] and only
//! read afterwards.

use crate::util::local_name;

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XmlNodeId(pub u32);

impl XmlNodeId {
    /// Sentinel value for no node.
    pub const NONE: XmlNodeId = XmlNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum XmlNodeData {
    /// Document root.
    Document,
    /// Element with its qualified name (e.g. `w:p`) and attributes.
    Element { name: String, attrs: Vec<Attribute> },
    /// Character data.
    Text(String),
}

/// XML attribute with its qualified name (e.g. `r:embed`).
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct XmlNode {
    pub data: XmlNodeData,
    pub parent: XmlNodeId,
    pub first_child: XmlNodeId,
    pub last_child: XmlNodeId,
    pub next_sibling: XmlNodeId,
}

impl XmlNode {
    fn new(data: XmlNodeData) -> Self {
        Self {
            data,
            parent: XmlNodeId::NONE,
            first_child: XmlNodeId::NONE,
            last_child: XmlNodeId::NONE,
            next_sibling: XmlNodeId::NONE,
        }
    }
}

/// Arena-based XML tree.
pub struct XmlDom {
    nodes: Vec<XmlNode>,
    document: XmlNodeId,
}

impl XmlDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: XmlNodeId::NONE,
        };
        dom.document = dom.alloc(XmlNode::new(XmlNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: XmlNode) -> XmlNodeId {
        let id = XmlNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> XmlNodeId {
        self.document
    }

    /// The outermost element (e.g. `w:document`), if any.
    pub fn root_element(&self) -> Option<XmlNodeId> {
        self.children(self.document).find(|&id| self.is_element(id))
    }

    /// Get a node by ID.
    pub fn get(&self, id: XmlNodeId) -> Option<&XmlNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: XmlNodeId) -> Option<&mut XmlNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node (not yet attached).
    pub fn create_element(&mut self, name: String, attrs: Vec<Attribute>) -> XmlNodeId {
        self.alloc(XmlNode::new(XmlNodeData::Element { name, attrs }))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: XmlNodeId, child: XmlNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(XmlNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: XmlNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(XmlNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let XmlNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.alloc(XmlNode::new(XmlNodeData::Text(text.to_string())));
        self.append(parent, text_node);
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node, in document order.
    pub fn children(&self, parent: XmlNodeId) -> ChildrenIter<'_> {
        ChildrenIter {
            dom: self,
            current: self.first_child(parent).unwrap_or(XmlNodeId::NONE),
        }
    }

    /// First child of a node (element or text).
    pub fn first_child(&self, id: XmlNodeId) -> Option<XmlNodeId> {
        self.get(id)
            .map(|n| n.first_child)
            .filter(XmlNodeId::is_some)
    }

    /// Iterate over all nodes below `root` in document order (pre-order),
    /// excluding `root` itself.
    pub fn descendants(&self, root: XmlNodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            root,
            next: self.first_child(root),
        }
    }

    /// Find the first descendant element with the given local name.
    pub fn find_descendant(&self, root: XmlNodeId, local: &str) -> Option<XmlNodeId> {
        self.descendants(root)
            .find(|&id| self.local_name(id) == Some(local))
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: XmlNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, XmlNodeData::Element { .. }))
    }

    /// Get element's qualified name (e.g. `w:p`).
    pub fn element_name(&self, id: XmlNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            XmlNodeData::Element { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Get element's local name (e.g. `p` for `w:p`).
    pub fn local_name(&self, id: XmlNodeId) -> Option<&str> {
        self.element_name(id).map(local_name)
    }

    /// Get an attribute value by local name (`val` matches `w:val`).
    pub fn attr(&self, id: XmlNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            XmlNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| local_name(&a.name) == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Concatenated character data of a node and all its descendants.
    pub fn text_content(&self, id: XmlNodeId) -> String {
        let mut text = String::new();
        if let Some(XmlNode {
            data: XmlNodeData::Text(t),
            ..
        }) = self.get(id)
        {
            text.push_str(t);
        }
        for node_id in self.descendants(id) {
            if let Some(XmlNode {
                data: XmlNodeData::Text(t),
                ..
            }) = self.get(node_id)
            {
                text.push_str(t);
            }
        }
        text
    }
}

impl Default for XmlDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a XmlDom,
    current: XmlNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = XmlNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(XmlNodeId::NONE);
        Some(id)
    }
}

/// Pre-order iterator over the subtree below a node.
pub struct Descendants<'a> {
    dom: &'a XmlDom,
    root: XmlNodeId,
    next: Option<XmlNodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = XmlNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        // Descend first, then move to the next sibling, climbing back up
        // until we find one or return to the root.
        self.next = self.dom.first_child(current).or_else(|| {
            let mut id = current;
            loop {
                if id == self.root {
                    return None;
                }
                let node = self.dom.get(id)?;
                if node.next_sibling.is_some() {
                    return Some(node.next_sibling);
                }
                id = node.parent;
                if id.is_none() || id == self.root {
                    return None;
                }
            }
        });

        Some(current)
    }
}
