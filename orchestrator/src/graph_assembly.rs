//! Turns the raw, alias-keyed rows a [`GraphQueryAdapter`] returns into a
//! [`GraphPayload`] of deduplicated nodes and edges (C3's result-parsing
//! contract, applied on the orchestrator side since the adapter trait only
//! promises generic rows).
//!
//! Nodes are recognized by the `__label` marker the adapter tags them with,
//! edges by `__type`. Edge endpoints are inferred from whichever node
//! aliases share the row with the edge alias — the generated queries always
//! bind a matched node to `a` and its neighbors to `b`/`c` (see
//! `adapters/neo4j/src/queries.rs`), so a row carrying both an edge and two
//! node aliases unambiguously identifies that edge's endpoints.
//!
//! Deduplication keys on the row's `id` property when present; a row
//! missing it falls back to an identity derived from its position (row
//! index, alias) so it still surfaces instead of being dropped.

use orchestrator_core::traits::GraphRow;
use orchestrator_core::types::{EdgeDto, GraphPayload, NodeDto};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

const NODE_ALIAS_ORDER: &[&str] = &["a", "b", "c"];
const EDGE_ALIASES: &[&str] = &["r", "rel"];

/// Namespace for the synthetic ids assembled rows fall back to when a row
/// is missing its stable `id` property, so such rows still surface and
/// dedup instead of being silently dropped.
const FALLBACK_ID_NAMESPACE: Uuid = Uuid::NAMESPACE_OID;

fn fallback_identity(row_index: usize, alias: &str) -> Uuid {
    Uuid::new_v5(&FALLBACK_ID_NAMESPACE, format!("row:{row_index}:{alias}").as_bytes())
}

pub fn assemble_graph_payload(rows: &[GraphRow]) -> GraphPayload {
    let mut nodes: HashMap<Uuid, NodeDto> = HashMap::new();
    let mut pending_edges: Vec<(Map<String, Value>, Vec<Uuid>, usize, &'static str)> = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let mut row_node_ids = Vec::new();
        for alias in NODE_ALIAS_ORDER {
            let Some(Value::Object(obj)) = row.columns.get(*alias) else {
                continue;
            };
            let fallback_id = fallback_identity(row_index, alias);
            if let Some(node) = node_dto_from_columns(obj, fallback_id) {
                row_node_ids.push(node.id);
                nodes.entry(node.id).or_insert(node);
            }
        }

        for alias in EDGE_ALIASES {
            if let Some(Value::Object(obj)) = row.columns.get(*alias) {
                pending_edges.push((obj.clone(), row_node_ids.clone(), row_index, alias));
            }
        }
    }

    let mut edges: HashMap<Uuid, EdgeDto> = HashMap::new();
    for (obj, row_node_ids, row_index, alias) in pending_edges {
        let edge_id = uuid_field(&obj, "id").unwrap_or_else(|| fallback_identity(row_index, alias));
        let (Some(&source), Some(&target)) = (row_node_ids.first(), row_node_ids.get(1)) else {
            warn!(%edge_id, "dropping edge whose endpoints were not emitted as nodes in this response");
            continue;
        };
        if !nodes.contains_key(&source) || !nodes.contains_key(&target) {
            warn!(%edge_id, "dropping edge with an endpoint missing from the node set");
            continue;
        }
        edges.entry(edge_id).or_insert_with(|| EdgeDto {
            id: edge_id,
            source,
            target,
            label: string_field(&obj, "label").unwrap_or_default(),
            description: string_field(&obj, "description").unwrap_or_default(),
            reasoning: string_field(&obj, "reasoning").unwrap_or_default(),
            note_ids: note_ids_field(&obj),
        });
    }

    let mut nodes: Vec<NodeDto> = nodes.into_values().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    let mut edges: Vec<EdgeDto> = edges.into_values().collect();
    edges.sort_by(|a, b| a.id.cmp(&b.id));

    GraphPayload { nodes, edges }
}

fn node_dto_from_columns(obj: &Map<String, Value>, fallback_id: Uuid) -> Option<NodeDto> {
    Some(NodeDto {
        id: uuid_field(obj, "id").unwrap_or(fallback_id),
        name: string_field(obj, "name").unwrap_or_default(),
        node_type: string_field(obj, "type").unwrap_or_default(),
        description: string_field(obj, "description").unwrap_or_default(),
        campaign_uuid: uuid_field(obj, "campaign_uuid")?,
        note_ids: note_ids_field(obj),
    })
}

fn uuid_field(obj: &Map<String, Value>, key: &str) -> Option<Uuid> {
    obj.get(key)?.as_str()?.parse().ok()
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)?.as_str().map(str::to_string)
}

/// Reads `note_ids` (a list) if present, else lifts a scalar `note_id` into
/// a one-element list (the backward-compatibility rule from the adapter
/// contract).
fn note_ids_field(obj: &Map<String, Value>) -> Vec<Uuid> {
    if let Some(Value::Array(values)) = obj.get("note_ids") {
        return values
            .iter()
            .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
            .collect();
    }
    if let Some(single) = obj.get("note_id").and_then(Value::as_str) {
        if let Ok(id) = single.parse() {
            return vec![id];
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_obj(id: Uuid, campaign: Uuid) -> Value {
        json!({
            "id": id.to_string(),
            "name": "Adam",
            "type": "Character",
            "description": "a rogue",
            "campaign_uuid": campaign.to_string(),
            "note_ids": [],
            "__label": "Foo_Artifact",
        })
    }

    fn edge_obj(id: Uuid) -> Value {
        json!({
            "id": id.to_string(),
            "label": "KNOWS",
            "description": "",
            "reasoning": "",
            "note_ids": [],
            "__type": "KNOWS",
        })
    }

    #[test]
    fn stitches_an_edge_to_the_two_nodes_in_its_row() {
        let campaign = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let e = Uuid::new_v4();

        let mut columns = Map::new();
        columns.insert("a".to_string(), node_obj(a, campaign));
        columns.insert("r".to_string(), edge_obj(e));
        columns.insert("b".to_string(), node_obj(b, campaign));

        let payload = assemble_graph_payload(&[GraphRow { columns }]);
        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.edges.len(), 1);
        assert_eq!(payload.edges[0].source, a);
        assert_eq!(payload.edges[0].target, b);
    }

    #[test]
    fn drops_an_edge_with_only_one_node_in_its_row() {
        let campaign = Uuid::new_v4();
        let a = Uuid::new_v4();
        let e = Uuid::new_v4();

        let mut columns = Map::new();
        columns.insert("a".to_string(), node_obj(a, campaign));
        columns.insert("r".to_string(), edge_obj(e));

        let payload = assemble_graph_payload(&[GraphRow { columns }]);
        assert_eq!(payload.nodes.len(), 1);
        assert!(payload.edges.is_empty());
    }

    #[test]
    fn a_node_missing_its_id_still_surfaces_via_a_fallback_identity() {
        let campaign = Uuid::new_v4();
        let mut obj = Map::new();
        obj.insert("name".to_string(), Value::String("Adam".to_string()));
        obj.insert("type".to_string(), Value::String("Character".to_string()));
        obj.insert("description".to_string(), Value::String("a rogue".to_string()));
        obj.insert("campaign_uuid".to_string(), Value::String(campaign.to_string()));

        let mut columns = Map::new();
        columns.insert("a".to_string(), Value::Object(obj));

        let payload = assemble_graph_payload(&[GraphRow { columns }]);
        assert_eq!(payload.nodes.len(), 1);
        assert_ne!(payload.nodes[0].id, Uuid::nil());
    }

    #[test]
    fn deduplicates_a_node_seen_across_multiple_rows() {
        let campaign = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut row1 = Map::new();
        row1.insert("a".to_string(), node_obj(a, campaign));
        row1.insert("b".to_string(), node_obj(b, campaign));

        let mut row2 = Map::new();
        row2.insert("a".to_string(), node_obj(a, campaign));

        let payload = assemble_graph_payload(&[GraphRow { columns: row1 }, GraphRow { columns: row2 }]);
        assert_eq!(payload.nodes.len(), 2);
    }
}
