//! Simulated executor - stands in for the real process/container layer
//!
//! Actually spawning processes is not this tool's job. The simulator tracks
//! state labels per resource, honors cancellation, and fabricates snapshots
//! the way a live monitor would, so the command state machine and the wire
//! boundary can be exercised end to end.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use stagehand_core::{
    EnvironmentSnapshot, Error, ResourceExecutor, ResourceSnapshot, Result, UrlSnapshot,
};
use stagehand_model::{AllocatedEndpoint, AppModel, Resource};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// In-memory executor: start/stop just flip state labels.
#[derive(Default)]
pub struct SimExecutor {
    states: DashMap<String, String>,
}

impl SimExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest state label for a resource, if any operation touched it.
    pub fn state(&self, name: &str) -> Option<String> {
        self.states.get(name).map(|s| s.value().clone())
    }
}

#[async_trait]
impl ResourceExecutor for SimExecutor {
    async fn start_resource(&self, name: &str, cancel: CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled(format!("start of `{name}`")));
        }
        self.states.insert(name.to_string(), "Running".to_string());
        info!(resource = name, "started");
        Ok(())
    }

    async fn stop_resource(&self, name: &str, cancel: CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled(format!("stop of `{name}`")));
        }
        self.states.insert(name.to_string(), "Exited".to_string());
        info!(resource = name, "stopped");
        Ok(())
    }
}

/// Allocates every declared endpoint on every resource, localhost with the
/// target port when given, otherwise sequential ports from `base_port`.
pub fn allocate_all(model: &AppModel, base_port: u16) -> Result<()> {
    let mut next_port = base_port;
    for resource in model.resources() {
        for endpoint in resource.endpoints() {
            let port = endpoint.target_port().unwrap_or_else(|| {
                let port = next_port;
                next_port += 1;
                port
            });
            let allocated = AllocatedEndpoint::new("localhost", port, endpoint.scheme());
            resource.allocate_endpoint(model.execution(), endpoint.name(), allocated)?;
        }
    }
    Ok(())
}

/// Fabricates the snapshot a live monitor would produce for a resource.
pub fn snapshot(
    resource: &Resource,
    state: Option<&str>,
    env: &BTreeMap<String, String>,
) -> ResourceSnapshot {
    ResourceSnapshot {
        name: resource.name().to_string(),
        resource_type: if resource.has_connection_string() {
            "value".to_string()
        } else {
            "service".to_string()
        },
        display_name: resource.name().to_string(),
        uid: Uuid::new_v4().to_string(),
        state: state.map(String::from),
        state_style: None,
        created_at: Some(Utc::now()),
        environment: env
            .iter()
            .map(|(name, value)| EnvironmentSnapshot {
                name: name.clone(),
                value: Some(value.clone()),
                is_from_spec: true,
            })
            .collect(),
        urls: resource
            .endpoints()
            .iter()
            .filter_map(|endpoint| {
                endpoint.allocated().map(|allocated| UrlSnapshot {
                    name: endpoint.name().to_string(),
                    url: allocated.uri(),
                    is_internal: false,
                })
            })
            .collect(),
        relationships: resource
            .relationships()
            .iter()
            .map(|rel| rel.to_snapshot())
            .collect(),
        properties: Vec::new(),
    }
}
