//! Resource snapshots - immutable point-in-time views of observed runtime status
//!
//! Snapshots are produced by the executor/monitor side and consumed read-only
//! by command state evaluators and the wire boundary. A status change yields a
//! fresh snapshot; nothing mutates an existing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time projection of a resource's observed status.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub name: String,
    pub resource_type: String,
    pub display_name: String,
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub environment: Vec<EnvironmentSnapshot>,
    #[serde(default)]
    pub urls: Vec<UrlSnapshot>,
    #[serde(default)]
    pub relationships: Vec<RelationshipSnapshot>,
    #[serde(default)]
    pub properties: Vec<PropertySnapshot>,
}

impl ResourceSnapshot {
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// The raw state text command evaluators classify on.
    pub fn state_text(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

/// One environment variable as observed on the running resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub is_from_spec: bool,
}

/// One URL exposed by the resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UrlSnapshot {
    pub name: String,
    pub url: String,
    pub is_internal: bool,
}

/// A graph edge as observed on the resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub resource_name: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// A named property on the resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub name: String,
    pub value: serde_json::Value,
}
