//! Resources - named units in the application graph
//!
//! A resource owns an ordered, append-only annotation collection. The graph
//! is finalized before any resolution pass runs; appending concurrently with
//! a pass is unsupported.

use crate::annotation::{
    Annotation, ConnectionStringAnnotation, EnvironmentCallbackAnnotation, RelationshipAnnotation,
    ServiceReferenceAnnotation,
};
use crate::command::CommandAnnotation;
use crate::endpoint::{AllocatedEndpoint, EndpointAnnotation};
use stagehand_core::{Error, ExecutionContext, Result};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// A named unit in the application graph: a service, container, or
/// infrastructure dependency. Names are unique and case-sensitive.
pub struct Resource {
    name: String,
    annotations: RwLock<Vec<Annotation>>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Annotation>> {
        self.annotations.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Annotation>> {
        self.annotations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an annotation. Order is preserved and significant.
    pub fn add_annotation(&self, annotation: Annotation) {
        debug!(resource = %self.name, kind = annotation.kind(), "annotation added");
        self.write().push(annotation);
    }

    /// Appends a command annotation, rejecting a duplicate type tag.
    pub fn add_command(&self, command: CommandAnnotation) -> Result<()> {
        let mut annotations = self.write();
        let duplicate = annotations.iter().any(|a| {
            matches!(a, Annotation::Command(existing)
                if existing.command_type() == command.command_type())
        });
        if duplicate {
            return Err(Error::duplicate_command(&self.name, command.command_type()));
        }
        debug!(resource = %self.name, command = command.command_type(), "command added");
        annotations.push(Annotation::Command(Arc::new(command)));
        Ok(())
    }

    pub fn annotation_count(&self) -> usize {
        self.read().len()
    }

    // -----------------------------------------------------------------------
    // Typed accessors, all in annotation insertion order
    // -----------------------------------------------------------------------

    pub fn endpoints(&self) -> Vec<Arc<EndpointAnnotation>> {
        self.read()
            .iter()
            .filter_map(|a| match a {
                Annotation::Endpoint(ep) => Some(ep.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn endpoint(&self, name: &str) -> Option<Arc<EndpointAnnotation>> {
        self.endpoints().into_iter().find(|ep| ep.name() == name)
    }

    pub fn environment_callbacks(&self) -> Vec<EnvironmentCallbackAnnotation> {
        self.read()
            .iter()
            .filter_map(|a| match a {
                Annotation::EnvironmentCallback(cb) => Some(cb.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<Arc<CommandAnnotation>> {
        self.read()
            .iter()
            .filter_map(|a| match a {
                Annotation::Command(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn command(&self, command_type: &str) -> Option<Arc<CommandAnnotation>> {
        self.commands()
            .into_iter()
            .find(|cmd| cmd.command_type() == command_type)
    }

    /// The accumulated service reference to the given producer, if any.
    pub fn service_reference_to(&self, producer: &str) -> Option<Arc<ServiceReferenceAnnotation>> {
        self.read().iter().find_map(|a| match a {
            Annotation::ServiceReference(sr) if sr.producer().name() == producer => {
                Some(sr.clone())
            }
            _ => None,
        })
    }

    pub fn relationships(&self) -> Vec<RelationshipAnnotation> {
        self.read()
            .iter()
            .filter_map(|a| match a {
                Annotation::Relationship(rel) => Some(rel.clone()),
                _ => None,
            })
            .collect()
    }

    /// The synthesized resource standing in for this one in Publish mode.
    /// The last registered target wins.
    pub fn deployment_target(&self) -> Option<Arc<Resource>> {
        self.read().iter().rev().find_map(|a| match a {
            Annotation::DeploymentTarget(dt) => Some(dt.target().clone()),
            _ => None,
        })
    }

    fn connection_string_annotation(&self) -> Option<ConnectionStringAnnotation> {
        // Last registration wins, consistent with append-only annotations.
        self.read().iter().rev().find_map(|a| match a {
            Annotation::ConnectionString(cs) => Some(cs.clone()),
            _ => None,
        })
    }

    /// Whether this resource exposes a connection string at all.
    pub fn has_connection_string(&self) -> bool {
        self.read()
            .iter()
            .any(|a| matches!(a, Annotation::ConnectionString(_)))
    }

    /// Resolves the connection string value, if the resource exposes one and
    /// its provider yields a value.
    pub fn connection_string(&self) -> Option<String> {
        self.connection_string_annotation().and_then(|cs| cs.get())
    }

    // -----------------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------------

    /// Records the concrete (host, port, scheme) for a declared endpoint.
    /// Happens at most once per endpoint and only in Run mode.
    pub fn allocate_endpoint(
        &self,
        execution: ExecutionContext,
        endpoint: &str,
        allocated: AllocatedEndpoint,
    ) -> Result<()> {
        if execution.is_publish() {
            return Err(Error::configuration(format!(
                "endpoint `{endpoint}` on resource `{}` cannot be allocated in publish mode",
                self.name
            )));
        }
        let ep = self
            .endpoint(endpoint)
            .ok_or_else(|| Error::UnknownEndpoint {
                resource: self.name.clone(),
                endpoint: endpoint.to_string(),
            })?;
        let uri = allocated.uri();
        if !ep.try_allocate(allocated) {
            return Err(Error::AlreadyAllocated {
                resource: self.name.clone(),
                endpoint: endpoint.to_string(),
            });
        }
        debug!(resource = %self.name, endpoint, %uri, "endpoint allocated");
        Ok(())
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("annotations", &self.annotation_count())
            .finish()
    }
}
