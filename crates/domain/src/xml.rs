//! XML inspection and pretty-printing
//!
//! Turns a raw XML document into a sequence of [`XmlLine`]s: one logical
//! unit per line, each made of classified [`XmlSpan`]s carrying a display
//! class. Presentation (indentation, color) is a separate rendering pass
//! over those lines, so the annotations never alter content.
//!
//! The formatter is total: input that does not parse is returned
//! unchanged instead of failing.

use serde::{Deserialize, Serialize};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Display class of one span within a formatted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XmlSpanKind {
    /// Structural markup: `<`, `>`, `</`, `/>`.
    Markup,
    /// An element name, including its namespace prefix.
    TagName,
    /// An attribute name together with its `=`.
    Attribute,
    /// A quoted attribute value.
    AttrValue,
    /// Plain element text.
    Text,
    /// The literal text `true`.
    BoolTrue,
    /// The literal text `false`.
    BoolFalse,
    /// The literal loan status `ACTIVE`.
    StatusActive,
    /// The literal loan status `RETURNED`.
    StatusReturned,
}

/// One classified fragment of a formatted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlSpan {
    /// Display class.
    pub kind: XmlSpanKind,
    /// Verbatim text of the fragment.
    pub text: String,
}

impl XmlSpan {
    fn new(kind: XmlSpanKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// One logical unit of the document, with its nesting depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlLine {
    /// Nesting depth; indentation is two spaces per level.
    pub depth: usize,
    /// The classified fragments making up the line.
    pub spans: Vec<XmlSpan>,
}

impl XmlLine {
    /// Concatenates the spans without any annotation.
    #[must_use]
    pub fn content(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Parses `raw_xml` and walks the tree into classified lines.
///
/// Returns `None` when the input is not well-formed XML; callers fall
/// back to the raw text.
#[must_use]
pub fn tokenize(raw_xml: &str) -> Option<Vec<XmlLine>> {
    let document = roxmltree::Document::parse(raw_xml).ok()?;
    let mut lines = Vec::new();
    walk(document.root_element(), 0, &mut lines);
    Some(lines)
}

/// Pretty-prints `raw_xml` with two-space indentation and no color.
///
/// Total: malformed input is returned unchanged.
#[must_use]
pub fn format(raw_xml: &str) -> String {
    tokenize(raw_xml).map_or_else(|| raw_xml.to_string(), |lines| render_plain(&lines))
}

/// Renders tokenized lines as indented plain text.
#[must_use]
pub fn render_plain(lines: &[XmlLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{}", "  ".repeat(line.depth), line.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn walk(node: roxmltree::Node<'_, '_>, depth: usize, lines: &mut Vec<XmlLine>) {
    let name = qualified_name(node);
    let mut spans = vec![
        XmlSpan::new(XmlSpanKind::Markup, "<"),
        XmlSpan::new(XmlSpanKind::TagName, name.clone()),
    ];
    spans.extend(attribute_spans(node));

    let children: Vec<roxmltree::Node<'_, '_>> = node
        .children()
        .filter(|c| {
            c.is_element() || (c.is_text() && c.text().is_some_and(|t| !t.trim().is_empty()))
        })
        .collect();

    match children.as_slice() {
        [] => {
            spans.push(XmlSpan::new(XmlSpanKind::Markup, "/>"));
            lines.push(XmlLine { depth, spans });
        }
        [only] if !only.is_element() => {
            spans.push(XmlSpan::new(XmlSpanKind::Markup, ">"));
            spans.push(text_span(only.text().unwrap_or_default().trim()));
            spans.push(XmlSpan::new(XmlSpanKind::Markup, "</"));
            spans.push(XmlSpan::new(XmlSpanKind::TagName, name));
            spans.push(XmlSpan::new(XmlSpanKind::Markup, ">"));
            lines.push(XmlLine { depth, spans });
        }
        _ => {
            spans.push(XmlSpan::new(XmlSpanKind::Markup, ">"));
            lines.push(XmlLine { depth, spans });

            for child in &children {
                if child.is_element() {
                    walk(*child, depth + 1, lines);
                } else {
                    lines.push(XmlLine {
                        depth: depth + 1,
                        spans: vec![text_span(child.text().unwrap_or_default().trim())],
                    });
                }
            }

            lines.push(XmlLine {
                depth,
                spans: vec![
                    XmlSpan::new(XmlSpanKind::Markup, "</"),
                    XmlSpan::new(XmlSpanKind::TagName, name),
                    XmlSpan::new(XmlSpanKind::Markup, ">"),
                ],
            });
        }
    }
}

/// Element name with its namespace prefix, as written in the source.
fn qualified_name(node: roxmltree::Node<'_, '_>) -> String {
    let name = node.tag_name().name();
    match node
        .tag_name()
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
    {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{name}"),
        _ => name.to_string(),
    }
}

/// Attribute spans, starting with the namespace declarations this element
/// introduces (in-scope namespaces minus the parent's).
fn attribute_spans(node: roxmltree::Node<'_, '_>) -> Vec<XmlSpan> {
    let mut spans = Vec::new();

    let inherited: Vec<(Option<&str>, &str)> = node.parent_element().map_or_else(Vec::new, |p| {
        p.namespaces().map(|ns| (ns.name(), ns.uri())).collect()
    });
    for ns in node.namespaces() {
        let pair = (ns.name(), ns.uri());
        if pair.1 == XML_NS || inherited.contains(&pair) {
            continue;
        }
        let attr_name = pair
            .0
            .map_or_else(|| "xmlns".to_string(), |prefix| format!("xmlns:{prefix}"));
        spans.push(XmlSpan::new(XmlSpanKind::Attribute, format!(" {attr_name}=")));
        spans.push(XmlSpan::new(
            XmlSpanKind::AttrValue,
            format!("\"{}\"", escape(pair.1)),
        ));
    }

    for attr in node.attributes() {
        spans.push(XmlSpan::new(
            XmlSpanKind::Attribute,
            format!(" {}=", attr.name()),
        ));
        spans.push(XmlSpan::new(
            XmlSpanKind::AttrValue,
            format!("\"{}\"", escape(attr.value())),
        ));
    }

    spans
}

/// Classifies element text, giving the semantic literals their own class.
fn text_span(text: &str) -> XmlSpan {
    let kind = match text {
        "true" => XmlSpanKind::BoolTrue,
        "false" => XmlSpanKind::BoolFalse,
        "ACTIVE" => XmlSpanKind::StatusActive,
        "RETURNED" => XmlSpanKind::StatusReturned,
        _ => XmlSpanKind::Text,
    };
    XmlSpan::new(kind, escape(text))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOAN_RESPONSE: &str = concat!(
        r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
        r#"<soap:Body>"#,
        r#"<ns2:createLoanResponse xmlns:ns2="http://library.example.com/loan">"#,
        r#"<ns2:success>true</ns2:success>"#,
        r#"<ns2:loan><ns2:id>12</ns2:id><ns2:status>ACTIVE</ns2:status></ns2:loan>"#,
        r#"</ns2:createLoanResponse>"#,
        r#"</soap:Body>"#,
        r#"</soap:Envelope>"#,
    );

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_malformed_input_is_identity() {
        assert_eq!(format("not <xml at all"), "not <xml at all");
        assert_eq!(format(""), "");
        assert_eq!(format("<unclosed>"), "<unclosed>");
    }

    #[test]
    fn test_depth_starts_and_ends_at_zero() {
        let lines = tokenize(LOAN_RESPONSE).unwrap();
        assert_eq!(lines.first().unwrap().depth, 0);
        assert_eq!(lines.last().unwrap().depth, 0);
        // Adjacent lines never jump by more than one level.
        for pair in lines.windows(2) {
            let delta = pair[1].depth.abs_diff(pair[0].depth);
            assert!(delta <= 1);
        }
    }

    #[test]
    fn test_one_logical_unit_per_line() {
        let formatted = format("<a><b>text</b><c x=\"1\"/></a>");
        let expected = "<a>\n  <b>text</b>\n  <c x=\"1\"/>\n</a>";
        assert_eq!(formatted, expected);
    }

    #[test]
    fn test_whitespace_stripped_round_trip() {
        let input = "<a><b>text</b><c x=\"1\"/></a>";
        assert_eq!(strip_whitespace(&format(input)), strip_whitespace(input));
    }

    #[test]
    fn test_namespace_declarations_kept_where_introduced() {
        let formatted = format(LOAN_RESPONSE);
        assert!(formatted.contains(
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">"
        ));
        assert!(formatted
            .contains("<ns2:createLoanResponse xmlns:ns2=\"http://library.example.com/loan\">"));
        // Declared once, not repeated on every descendant.
        assert_eq!(formatted.matches("xmlns:ns2=").count(), 1);
    }

    #[test]
    fn test_semantic_literals_get_their_own_class() {
        let lines = tokenize(LOAN_RESPONSE).unwrap();
        let kinds: Vec<XmlSpanKind> = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.kind))
            .collect();
        assert!(kinds.contains(&XmlSpanKind::BoolTrue));
        assert!(kinds.contains(&XmlSpanKind::StatusActive));
    }

    #[test]
    fn test_annotations_do_not_alter_content() {
        let lines = tokenize(LOAN_RESPONSE).unwrap();
        let joined: String = lines.iter().map(|l| l.content()).collect();
        assert_eq!(strip_whitespace(&joined), strip_whitespace(LOAN_RESPONSE));
    }

    #[test]
    fn test_format_is_idempotent() {
        let once = format(LOAN_RESPONSE);
        assert_eq!(format(&once), once);
    }

    #[test]
    fn test_text_escaping_preserved() {
        let formatted = format("<m>a &amp; b</m>");
        assert_eq!(formatted, "<m>a &amp; b</m>");
    }
}
