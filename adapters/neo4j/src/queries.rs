//! Read-only Cypher used by this adapter and referenced by the Cypher
//! generation prompt, which must describe the same schema these templates
//! query against.

/// A human-readable schema description, interpolated into the
/// `assistant-cypher-generation` prompt so the model's generated query
/// matches what this adapter can actually execute.
pub const ARTIFACT_SCHEMA_DESCRIPTION: &str = r#"
Node label: {campaignLabel}_Artifact
Node properties: id (uuid), name (string), type (string), description (string),
  campaign_uuid (uuid), note_ids (list of uuid)
Edge properties: id (uuid), label (string), description (string), reasoning (string),
  campaign_uuid (uuid), note_ids (list of uuid)
"#;

/// A single artifact node and its immediate neighborhood, 0 hops
/// (`node_details` scope — the node itself, no traversal).
pub const NODE_DETAILS: &str = r#"
MATCH (a:${label} {id: $artifactId, campaign_uuid: $campaignUuid})
RETURN a
"#;

/// An artifact's 1-hop neighborhood (`relationships` scope).
pub const ONE_HOP_NEIGHBORHOOD: &str = r#"
MATCH (a:${label} {id: $artifactId, campaign_uuid: $campaignUuid})
OPTIONAL MATCH (a)-[r]-(b:${label})
WHERE b.campaign_uuid = $campaignUuid
RETURN a, r, b
"#;

/// An artifact's 2-hop neighborhood (`full_subgraph` scope).
pub const TWO_HOP_NEIGHBORHOOD: &str = r#"
MATCH (a:${label} {id: $artifactId, campaign_uuid: $campaignUuid})
OPTIONAL MATCH p = (a)-[*1..2]-(b:${label})
WHERE b.campaign_uuid = $campaignUuid
RETURN a, p
"#;

/// A relationship's endpoints plus their immediate neighbors, used when the
/// planner's decision identified a relationship rather than an artifact.
pub const RELATIONSHIP_NEIGHBORHOOD: &str = r#"
MATCH (a:${label})-[rel {id: $relationshipId, campaign_uuid: $campaignUuid}]-(b:${label})
OPTIONAL MATCH (a)-[r]-(c:${label})
WHERE c.campaign_uuid = $campaignUuid
RETURN a, rel, b, r, c
"#;

pub const HEALTH_CHECK: &str = "RETURN 1 as test";
