//! Maps WordprocessingML element names to node kinds.
//!
//! The set is closed: every element the markup converter does not know about
//! classifies as [`NodeKind::Other`], which makes the "drop the subtree"
//! fallthrough an explicit match arm rather than a missing case.

/// The kind of a document tree node, as far as markup conversion cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Structural wrapper (`document`, `body`).
    Container,
    /// Paragraph (`p`).
    Paragraph,
    /// Paragraph-level properties (`pPr`).
    ParagraphProperties,
    /// Reference to a paragraph style (`pStyle`).
    ParagraphStyle,
    /// Character run (`r`).
    Run,
    /// Run-level properties (`rPr`); only meaningful as a run's first child.
    RunProperties,
    /// Line or page break (`br`); only meaningful as a run's first child.
    Break,
    /// Literal text (`t`).
    Text,
    /// Footnote reference (`footnoteReference`).
    FootnoteReference,
    /// Table (`tbl`).
    Table,
    /// Table row (`tr`).
    TableRow,
    /// Embedded drawing (`drawing`).
    Drawing,
    /// Known noise (`proofErr`).
    Ignorable,
    /// Anything else. Dropped together with its subtree.
    Other,
}

impl NodeKind {
    /// Classify an element by its local name.
    pub fn classify(local_name: &str) -> Self {
        match local_name {
            "document" | "body" => NodeKind::Container,
            "p" => NodeKind::Paragraph,
            "pPr" => NodeKind::ParagraphProperties,
            "pStyle" => NodeKind::ParagraphStyle,
            "r" => NodeKind::Run,
            "rPr" => NodeKind::RunProperties,
            "br" => NodeKind::Break,
            "t" => NodeKind::Text,
            "footnoteReference" => NodeKind::FootnoteReference,
            "tbl" => NodeKind::Table,
            "tr" => NodeKind::TableRow,
            "drawing" => NodeKind::Drawing,
            "proofErr" => NodeKind::Ignorable,
            _ => NodeKind::Other,
        }
    }
}
