//! Bridges kramdown-only constructs to what the CommonMark engine understands.
//!
//! Two constructs need help before the markup reaches `pulldown-cmark`:
//!
//! - block attribute lines such as `{: .class = 'title' }`, which become an
//!   HTML comment marker (picked up again by the HTML renderer) or vanish
//! - header-less pipe tables (`|a|b|`), which get an empty header row and a
//!   delimiter row so the engine recognises them as tables

/// Prefix of the comment that carries block classes through the engine.
pub(crate) const CLASS_MARKER_PREFIX: &str = "<!-- docxconv:class=";
const CLASS_MARKER_SUFFIX: &str = " -->";

/// What to do with block attribute lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeHandling {
    /// Replace with a class marker comment.
    Mark,
    /// Remove the line.
    Drop,
}

/// Rewrite markup for the rendering engine.
pub fn bridge(markup: &str, attributes: AttributeHandling) -> String {
    let lines: Vec<&str> = markup.lines().collect();
    let mut out = String::with_capacity(markup.len() + 64);
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(classes) = attribute_classes(line) {
            if attributes == AttributeHandling::Mark && !classes.is_empty() {
                out.push_str(&class_marker(&classes));
                out.push('\n');
            }
            i += 1;
            continue;
        }

        if is_table_row(line) {
            let start = i;
            while i < lines.len() && is_table_row(lines[i]) {
                i += 1;
            }
            push_table(&mut out, &lines[start..i]);
            continue;
        }

        out.push_str(line);
        out.push('\n');
        i += 1;
    }

    out
}

/// Classes named by a block attribute line, or `None` if `line` is not one.
///
/// Understands `.name` shorthands and `class = 'a b'` assignments.
pub fn attribute_classes(line: &str) -> Option<Vec<String>> {
    let inner = line.trim().strip_prefix("{:")?.strip_suffix('}')?;
    let tokens: Vec<&str> = inner.split_whitespace().collect();

    let mut classes = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let name = token.strip_prefix('.').unwrap_or(token);

        if tokens.get(i + 1) == Some(&"=") {
            if name == "class" {
                if let Some(value) = tokens.get(i + 2) {
                    let value = value.trim_matches(|c| c == '\'' || c == '"');
                    classes.extend(value.split_whitespace().map(str::to_string));
                }
            }
            i += 3;
            continue;
        }

        if token.starts_with('.') && !name.is_empty() {
            classes.push(name.to_string());
        }
        i += 1;
    }

    Some(classes)
}

/// The block attribute line a chapter ends with, if any.
///
/// Blank lines and the footnote definitions appended to a chapter are
/// skipped. Such a line annotates the heading that opens the next chapter.
pub fn trailing_attribute(markup: &str) -> Option<&str> {
    let line = markup
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty() && !is_footnote_definition(line))?;
    attribute_classes(line).map(|_| line)
}

fn is_footnote_definition(line: &str) -> bool {
    line.starts_with("[^") && line.contains("]: ")
}

/// Classes carried by a marker comment produced by [`bridge`].
pub(crate) fn marker_classes(html: &str) -> Option<&str> {
    html.trim()
        .strip_prefix(CLASS_MARKER_PREFIX)?
        .strip_suffix(CLASS_MARKER_SUFFIX)
}

fn class_marker(classes: &[String]) -> String {
    format!("{CLASS_MARKER_PREFIX}{}{CLASS_MARKER_SUFFIX}", classes.join(" "))
}

fn is_table_row(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 2 && line.starts_with('|') && line.ends_with('|')
}

fn is_delimiter_row(line: &str) -> bool {
    is_table_row(line)
        && line
            .trim()
            .trim_matches('|')
            .split('|')
            .all(|cell| !cell.trim().is_empty() && cell.trim().chars().all(|c| matches!(c, '-' | ':')))
}

fn cell_count(row: &str) -> usize {
    row.trim().matches('|').count().saturating_sub(1).max(1)
}

fn push_table(out: &mut String, rows: &[&str]) {
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }

    let has_header = rows.get(1).is_some_and(|row| is_delimiter_row(row));
    if !has_header {
        let columns = rows.iter().map(|row| cell_count(row)).max().unwrap_or(1);
        out.push('|');
        out.push_str(&" |".repeat(columns));
        out.push('\n');
        out.push('|');
        out.push_str(&"---|".repeat(columns));
        out.push('\n');
    }

    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_classes() {
        assert_eq!(
            attribute_classes("{: .class = 'title' }"),
            Some(vec!["title".to_string()])
        );
        assert_eq!(
            attribute_classes("{: .lead .wide}"),
            Some(vec!["lead".to_string(), "wide".to_string()])
        );
        assert_eq!(attribute_classes("{: #intro}"), Some(Vec::new()));
        assert_eq!(attribute_classes("plain text"), None);
        assert_eq!(attribute_classes("{not an attribute}"), None);
    }

    #[test]
    fn test_bridge_marks_attribute_line() {
        let out = bridge("{: .class = 'title' }\n# Book\n", AttributeHandling::Mark);
        assert_eq!(out, "<!-- docxconv:class=title -->\n# Book\n");
        assert_eq!(marker_classes("<!-- docxconv:class=title -->\n"), Some("title"));
    }

    #[test]
    fn test_bridge_drops_attribute_line() {
        let out = bridge("{: .class = 'title' }\n# Book\n", AttributeHandling::Drop);
        assert_eq!(out, "# Book\n");
    }

    #[test]
    fn test_bridge_adds_table_header() {
        let out = bridge("before\n\n|A|B|\n|C|D|E|\nafter\n", AttributeHandling::Drop);
        assert_eq!(
            out,
            "before\n\n| | | |\n|---|---|---|\n|A|B|\n|C|D|E|\n\nafter\n"
        );
    }

    #[test]
    fn test_bridge_separates_table_from_paragraph() {
        let out = bridge("text\n|A|\n", AttributeHandling::Drop);
        assert_eq!(out, "text\n\n| |\n|---|\n|A|\n\n");
    }

    #[test]
    fn test_bridge_keeps_existing_header() {
        let out = bridge("|H|\n|---|\n|A|\n", AttributeHandling::Drop);
        assert_eq!(out, "|H|\n|---|\n|A|\n\n");
    }

    #[test]
    fn test_trailing_attribute() {
        assert_eq!(
            trailing_attribute("intro\n{: .class = 'title' }\n\n\n"),
            Some("{: .class = 'title' }")
        );
        assert_eq!(
            trailing_attribute("{: .lead }\n\n\n[^1]: Note\n\n"),
            Some("{: .lead }")
        );
        assert_eq!(trailing_attribute("# One\n\ntext\n\n\n"), None);
        assert_eq!(trailing_attribute(""), None);
    }

    #[test]
    fn test_empty_cells_count() {
        assert_eq!(cell_count("||"), 1);
        assert_eq!(cell_count("|a||c|"), 3);
    }
}
