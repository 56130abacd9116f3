//! Conversion helpers between `neo4j` driver values and this adapter's
//! generic row representation.

use chrono::{DateTime, Utc};
use orchestrator_core::errors::GraphError;
use serde_json::{Map, Value};

/// Parse a datetime value as returned by the driver.
pub fn parse_neo4j_datetime(value: &Value) -> Result<DateTime<Utc>, GraphError> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| GraphError::QueryFailed(format!("invalid datetime format: {e}"))),
        _ => Err(GraphError::QueryFailed("expected string datetime".to_string())),
    }
}

/// Flatten a `neo4j::Node`'s properties plus its primary label into the
/// generic column map a [`orchestrator_core::traits::GraphRow`] carries.
pub fn node_to_columns(node: &neo4j::Node) -> Map<String, Value> {
    let mut columns = Map::new();
    for (key, value) in node.properties().iter() {
        columns.insert(key.clone(), value.clone());
    }
    if let Some(label) = node.labels().first() {
        columns.insert("__label".to_string(), Value::String(label.clone()));
    }
    columns
}

/// Flatten a `neo4j::Relationship`'s properties into the generic column
/// map, tagging start/end node identities so the caller can stitch edges
/// back to the nodes emitted in the same row.
pub fn relationship_to_columns(rel: &neo4j::Relationship) -> Map<String, Value> {
    let mut columns = Map::new();
    for (key, value) in rel.properties().iter() {
        columns.insert(key.clone(), value.clone());
    }
    columns.insert("__type".to_string(), Value::String(rel.rel_type().clone()));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rfc3339_datetime() {
        let value = json!("2024-01-01T00:00:00Z");
        let parsed = parse_neo4j_datetime(&value).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_non_string_datetime() {
        assert!(parse_neo4j_datetime(&json!(1234)).is_err());
    }
}
