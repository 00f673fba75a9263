//! Document tree for package XML parts.
//!
//! - [`XmlDom`]: arena-allocated tree of elements and character data
//! - [`parse_xml`]: quick-xml driven builder
//! - [`NodeKind`]: closed classification used by the markup converter

mod arena;
mod builder;
mod kind;

pub use arena::{Attribute, ChildrenIter, Descendants, XmlDom, XmlNode, XmlNodeData, XmlNodeId};
pub use builder::parse_xml;
pub use kind::NodeKind;
