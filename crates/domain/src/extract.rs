//! Encoding-agnostic response field extraction
//!
//! Pulls a named value out of a raw response body without caring which
//! encoding the collaborator chose. Extraction fails soft: parse errors,
//! empty input, and missing fields all yield `None` so that dependent
//! assertions fail at the "field missing" check rather than at parse time.

use serde::{Deserialize, Serialize};

/// Hint for how to parse the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// A JSON document; the field is a top-level object key.
    Json,
    /// An XML document; the field is a local element name, namespaces
    /// ignored.
    Xml,
}

/// Extracts the value of `field` from `raw_body` under the given encoding.
///
/// JSON: top-level key lookup; string values are returned verbatim, other
/// value kinds through their JSON rendering. XML: depth-first search over
/// all elements, matching on the local tag name regardless of namespace
/// prefix or URI; the first match in document order wins and its text
/// content is returned.
#[must_use]
pub fn extract_field(raw_body: &str, field: &str, encoding: Encoding) -> Option<String> {
    match encoding {
        Encoding::Json => extract_json(raw_body, field),
        Encoding::Xml => extract_xml(raw_body, field),
    }
}

fn extract_json(raw_body: &str, field: &str) -> Option<String> {
    let document: serde_json::Value = serde_json::from_str(raw_body).ok()?;
    match document.get(field)? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn extract_xml(raw_body: &str, field: &str) -> Option<String> {
    let document = roxmltree::Document::parse(raw_body).ok()?;
    document
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name() == field)
        .and_then(|node| node.text())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_top_level_string() {
        let body = r#"{"token": "eyJhbGciOi.payload.sig", "valid": true}"#;
        assert_eq!(
            extract_field(body, "token", Encoding::Json).unwrap(),
            "eyJhbGciOi.payload.sig"
        );
    }

    #[test]
    fn test_json_non_string_values_render_as_json() {
        let body = r#"{"id": 42, "valid": true}"#;
        assert_eq!(extract_field(body, "id", Encoding::Json).unwrap(), "42");
        assert_eq!(extract_field(body, "valid", Encoding::Json).unwrap(), "true");
    }

    #[test]
    fn test_json_missing_key_and_parse_error() {
        assert_eq!(extract_field(r#"{"a": 1}"#, "b", Encoding::Json), None);
        assert_eq!(extract_field("{not json", "a", Encoding::Json), None);
        assert_eq!(extract_field("", "a", Encoding::Json), None);
    }

    #[test]
    fn test_json_nested_keys_are_not_top_level() {
        let body = r#"{"outer": {"token": "hidden"}}"#;
        assert_eq!(extract_field(body, "token", Encoding::Json), None);
    }

    #[test]
    fn test_xml_ignores_namespace() {
        let body = concat!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<soap:Body><ns2:createLoanResponse xmlns:ns2="http://library.example.com/loan">"#,
            r#"<ns2:status>ACTIVE</ns2:status>"#,
            r#"</ns2:createLoanResponse></soap:Body></soap:Envelope>"#,
        );
        assert_eq!(
            extract_field(body, "status", Encoding::Xml).unwrap(),
            "ACTIVE"
        );
    }

    #[test]
    fn test_xml_default_namespace() {
        let body = r#"<resp xmlns="http://library.example.com/loan"><success>true</success></resp>"#;
        assert_eq!(
            extract_field(body, "success", Encoding::Xml).unwrap(),
            "true"
        );
    }

    #[test]
    fn test_xml_first_match_in_document_order() {
        let body = "<root><loan><id>5</id></loan><loan><id>6</id></loan></root>";
        assert_eq!(extract_field(body, "id", Encoding::Xml).unwrap(), "5");
    }

    #[test]
    fn test_xml_parse_error_and_empty() {
        assert_eq!(extract_field("<unclosed", "x", Encoding::Xml), None);
        assert_eq!(extract_field("", "x", Encoding::Xml), None);
    }
}
