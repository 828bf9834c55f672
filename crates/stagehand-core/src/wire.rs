//! Wire projection - maps snapshots into transmission messages
//!
//! The wire shape is what monitoring clients receive. Absent state text maps
//! to an empty string, the creation timestamp is emitted only when present,
//! and relationship property values are flattened to strings.

use crate::snapshot::ResourceSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transmission form of a resource snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResource {
    pub name: String,
    pub resource_type: String,
    pub display_name: String,
    pub uid: String,
    pub state: String,
    pub state_style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub environment: Vec<WireEnvironmentVariable>,
    pub urls: Vec<WireUrl>,
    pub relationships: Vec<WireRelationship>,
    pub properties: Vec<WireProperty>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEnvironmentVariable {
    pub name: String,
    pub value: String,
    pub is_from_spec: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUrl {
    pub name: String,
    pub full_url: String,
    pub is_internal: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRelationship {
    pub resource_name: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub properties: Vec<WireRelationshipProperty>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireRelationshipProperty {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireProperty {
    pub name: String,
    pub value: serde_json::Value,
}

impl WireResource {
    pub fn from_snapshot(snapshot: &ResourceSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            resource_type: snapshot.resource_type.clone(),
            display_name: snapshot.display_name.clone(),
            uid: snapshot.uid.clone(),
            state: snapshot.state.clone().unwrap_or_default(),
            state_style: snapshot.state_style.clone().unwrap_or_default(),
            created_at: snapshot.created_at,
            environment: snapshot
                .environment
                .iter()
                .map(|env| WireEnvironmentVariable {
                    name: env.name.clone(),
                    value: env.value.clone().unwrap_or_default(),
                    is_from_spec: env.is_from_spec,
                })
                .collect(),
            urls: snapshot
                .urls
                .iter()
                .map(|url| WireUrl {
                    name: url.name.clone(),
                    full_url: url.url.clone(),
                    is_internal: url.is_internal,
                })
                .collect(),
            relationships: snapshot
                .relationships
                .iter()
                .map(|rel| WireRelationship {
                    resource_name: rel.resource_name.clone(),
                    relationship_type: rel.relationship_type.clone(),
                    properties: rel
                        .properties
                        .iter()
                        .map(|(name, value)| WireRelationshipProperty {
                            name: name.clone(),
                            value: property_value_string(value),
                        })
                        .collect(),
                })
                .collect(),
            properties: snapshot
                .properties
                .iter()
                .map(|prop| WireProperty {
                    name: prop.name.clone(),
                    value: prop.value.clone(),
                })
                .collect(),
        }
    }
}

/// Flatten an arbitrary JSON value to its string form. Bare strings stay
/// unquoted; everything else renders as compact JSON.
fn property_value_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
