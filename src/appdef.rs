//! Application definition - serde structs for the TOML app file
//!
//! Pure types, parsing, and model construction. The CLI decides what to do
//! with the resulting graph.

use anyhow::{bail, Context};
use serde::Deserialize;
use stagehand_commands::LifecycleCommandsExt;
use stagehand_core::ExecutionContext;
use stagehand_model::{AppModel, AppModelBuilder, Resource, ResourceBuilder};
use stagehand_resolve::{ConnectionRefOptions, ReferenceExt};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppDefinition {
    pub app: AppSection,
    #[serde(rename = "resource")]
    pub resources: Vec<ResourceDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceDef {
    pub name: String,
    pub connection_string: Option<String>,
    pub lifecycle_commands: bool,
    /// Resource substituted for this one when publishing.
    pub deployment_target: Option<String>,
    pub endpoints: Vec<EndpointDef>,
    /// Whole-resource references by producer name.
    pub references: Vec<String>,
    pub endpoint_references: Vec<EndpointRefDef>,
    pub connection_references: Vec<ConnectionRefDef>,
    pub url_references: Vec<UrlRefDef>,
    pub relationships: Vec<RelationshipDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointDef {
    pub name: String,
    pub scheme: String,
    pub target_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointRefDef {
    pub resource: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionRefDef {
    pub resource: String,
    pub key: Option<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UrlRefDef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelationshipDef {
    pub resource: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
}

impl AppDefinition {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Builds the resource graph. Resources are created first so references
    /// can point forward in the file; reference declarations run second.
    pub fn build_model(&self, execution: ExecutionContext) -> anyhow::Result<AppModel> {
        let mut builder = AppModelBuilder::new(execution);
        let mut builders: HashMap<String, ResourceBuilder> = HashMap::new();

        for def in &self.resources {
            let mut rb = builder.add_resource(&def.name)?;
            for endpoint in &def.endpoints {
                rb = rb.with_endpoint(&endpoint.name, &endpoint.scheme, endpoint.target_port);
            }
            if let Some(value) = &def.connection_string {
                rb = rb.with_connection_string(value.clone());
            }
            if def.lifecycle_commands {
                rb = rb.with_lifecycle_commands()?;
            }
            builders.insert(def.name.clone(), rb);
        }

        for def in &self.resources {
            let mut rb = builders[&def.name].clone();
            for producer in &def.references {
                let producer = producer_arc(&builders, &def.name, producer)?;
                rb = rb.with_reference(&producer);
            }
            for reference in &def.endpoint_references {
                let producer = producer_arc(&builders, &def.name, &reference.resource)?;
                rb = rb.with_endpoint_reference(&producer, &reference.endpoint);
            }
            for reference in &def.connection_references {
                let producer = producer_arc(&builders, &def.name, &reference.resource)?;
                rb = rb.with_connection_reference(
                    &producer,
                    ConnectionRefOptions {
                        key: reference.key.clone(),
                        optional: reference.optional,
                    },
                );
            }
            for reference in &def.url_references {
                rb = rb.with_url_reference(&reference.name, &reference.url)?;
            }
            for relationship in &def.relationships {
                let target = producer_arc(&builders, &def.name, &relationship.resource)?;
                rb = rb.with_relationship(&target, &relationship.relationship_type);
            }
            if let Some(target) = &def.deployment_target {
                let target = producer_arc(&builders, &def.name, target)?;
                rb = rb.with_deployment_target(target);
            }
            let _ = rb;
        }

        Ok(builder.build())
    }
}

fn producer_arc(
    builders: &HashMap<String, ResourceBuilder>,
    consumer: &str,
    name: &str,
) -> anyhow::Result<Arc<Resource>> {
    match builders.get(name) {
        Some(rb) => Ok(rb.resource().clone()),
        None => bail!("resource `{consumer}` references unknown resource `{name}`"),
    }
}
