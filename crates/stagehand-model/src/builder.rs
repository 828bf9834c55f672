//! Application model builders - graph construction for one orchestration session

use crate::annotation::{
    Annotation, ConnectionStringAnnotation, DeploymentTargetAnnotation, EnvCallbackContext,
    EnvironmentCallbackAnnotation, RelationshipAnnotation,
};
use crate::command::CommandAnnotation;
use crate::endpoint::EndpointAnnotation;
use crate::resource::Resource;
use stagehand_core::{Error, ExecutionContext, Result};
use std::sync::Arc;
use tracing::debug;

/// The finalized resource graph for a session. Read-only after build; only
/// endpoint allocation mutates it afterwards, and only before resolution.
#[derive(Debug)]
pub struct AppModel {
    resources: Vec<Arc<Resource>>,
    execution: ExecutionContext,
}

impl AppModel {
    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.resources
    }

    pub fn resource(&self, name: &str) -> Option<&Arc<Resource>> {
        self.resources.iter().find(|r| r.name() == name)
    }

    pub fn execution(&self) -> ExecutionContext {
        self.execution
    }
}

/// Builds the resource graph for one session.
pub struct AppModelBuilder {
    execution: ExecutionContext,
    resources: Vec<Arc<Resource>>,
}

impl AppModelBuilder {
    pub fn new(execution: ExecutionContext) -> Self {
        Self {
            execution,
            resources: Vec::new(),
        }
    }

    pub fn execution(&self) -> ExecutionContext {
        self.execution
    }

    /// Adds a resource with a unique, case-sensitive name and returns a
    /// builder for annotating it.
    pub fn add_resource(&mut self, name: &str) -> Result<ResourceBuilder> {
        if self.resources.iter().any(|r| r.name() == name) {
            return Err(Error::DuplicateResource(name.to_string()));
        }
        let resource = Arc::new(Resource::new(name));
        debug!(resource = name, "resource added");
        self.resources.push(resource.clone());
        Ok(ResourceBuilder {
            resource,
            execution: self.execution,
        })
    }

    pub fn build(self) -> AppModel {
        AppModel {
            resources: self.resources,
            execution: self.execution,
        }
    }
}

/// Annotates one resource. Cheap to clone; clones share the resource.
#[derive(Clone, Debug)]
pub struct ResourceBuilder {
    resource: Arc<Resource>,
    execution: ExecutionContext,
}

impl ResourceBuilder {
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    pub fn execution(&self) -> ExecutionContext {
        self.execution
    }

    pub fn with_annotation(self, annotation: Annotation) -> Self {
        self.resource.add_annotation(annotation);
        self
    }

    /// Declares a named endpoint with a transport scheme and optional target
    /// port. Allocation happens later, through the execution layer.
    pub fn with_endpoint(self, name: &str, scheme: &str, target_port: Option<u16>) -> Self {
        self.with_annotation(Annotation::Endpoint(Arc::new(EndpointAnnotation::new(
            name,
            scheme,
            target_port,
        ))))
    }

    /// Registers an environment callback invoked once per resolution pass.
    pub fn with_environment(
        self,
        callback: impl Fn(&mut EnvCallbackContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.with_annotation(Annotation::EnvironmentCallback(
            EnvironmentCallbackAnnotation::new(callback),
        ))
    }

    /// Exposes a fixed connection string.
    pub fn with_connection_string(self, value: impl Into<String>) -> Self {
        self.with_annotation(Annotation::ConnectionString(
            ConnectionStringAnnotation::from_value(value),
        ))
    }

    /// Exposes a connection string computed on demand.
    pub fn with_connection_string_provider(
        self,
        provider: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.with_annotation(Annotation::ConnectionString(ConnectionStringAnnotation::new(
            provider,
        )))
    }

    /// Records a metadata edge to another resource.
    pub fn with_relationship(self, target: &Arc<Resource>, relationship_type: &str) -> Self {
        self.with_annotation(Annotation::Relationship(RelationshipAnnotation::new(
            target.clone(),
            relationship_type,
        )))
    }

    /// Substitutes a synthesized resource for this one in Publish mode.
    pub fn with_deployment_target(self, target: Arc<Resource>) -> Self {
        self.with_annotation(Annotation::DeploymentTarget(DeploymentTargetAnnotation::new(
            target,
        )))
    }

    /// Attaches a command. A duplicate type tag is a configuration error.
    pub fn with_command(self, command: CommandAnnotation) -> Result<Self> {
        self.resource.add_command(command)?;
        Ok(self)
    }
}
