//! The three conformance suites, one scenario each.

pub mod auth;
pub mod rest;
pub mod soap;

/// Parses the `data` array of a paginated REST listing body.
pub(crate) fn data_array(body: &str) -> Vec<serde_json::Value> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("data").and_then(|d| d.as_array().cloned()))
        .unwrap_or_default()
}

/// Numeric `id` fields of a listing's `data` array, in order.
pub(crate) fn data_ids(body: &str) -> Vec<i64> {
    data_array(body)
        .iter()
        .filter_map(|entry| entry.get("id").and_then(serde_json::Value::as_i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_data_ids_from_listing() {
        let body = r#"{"data":[{"id":4,"title":"a"},{"id":9}],"total":2}"#;
        assert_eq!(data_ids(body), vec![4, 9]);
    }

    #[test]
    fn test_data_ids_tolerates_malformed_body() {
        assert!(data_ids("not json").is_empty());
        assert!(data_ids(r#"{"data":"oops"}"#).is_empty());
    }
}
