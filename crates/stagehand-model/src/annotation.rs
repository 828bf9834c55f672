//! Polymorphic annotations - typed facts and capabilities attached to a resource

use crate::command::CommandAnnotation;
use crate::endpoint::EndpointAnnotation;
use crate::resource::Resource;
use stagehand_core::{ExecutionContext, RelationshipSnapshot, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One annotation on a resource. Resolution code matches on the variant;
/// there is no open inheritance.
pub enum Annotation {
    Endpoint(Arc<EndpointAnnotation>),
    EnvironmentCallback(EnvironmentCallbackAnnotation),
    Command(Arc<CommandAnnotation>),
    ServiceReference(Arc<ServiceReferenceAnnotation>),
    Relationship(RelationshipAnnotation),
    DeploymentTarget(DeploymentTargetAnnotation),
    ConnectionString(ConnectionStringAnnotation),
}

impl Annotation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Endpoint(_) => "endpoint",
            Self::EnvironmentCallback(_) => "environment-callback",
            Self::Command(_) => "command",
            Self::ServiceReference(_) => "service-reference",
            Self::Relationship(_) => "relationship",
            Self::DeploymentTarget(_) => "deployment-target",
            Self::ConnectionString(_) => "connection-string",
        }
    }
}

// ---------------------------------------------------------------------------
// Environment callbacks
// ---------------------------------------------------------------------------

/// Context handed to each environment callback: the session's execution mode
/// and the environment map being built. The map is exclusively owned by the
/// resolution pass that constructs it.
pub struct EnvCallbackContext<'a> {
    pub execution: ExecutionContext,
    pub env: &'a mut BTreeMap<String, String>,
}

type EnvCallback = dyn Fn(&mut EnvCallbackContext<'_>) -> Result<()> + Send + Sync;

/// A deferred environment mutation, invoked once per resolution pass in
/// annotation order.
#[derive(Clone)]
pub struct EnvironmentCallbackAnnotation {
    callback: Arc<EnvCallback>,
}

impl EnvironmentCallbackAnnotation {
    pub fn new(
        callback: impl Fn(&mut EnvCallbackContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn invoke(&self, context: &mut EnvCallbackContext<'_>) -> Result<()> {
        (self.callback)(context)
    }
}

impl std::fmt::Debug for EnvironmentCallbackAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EnvironmentCallbackAnnotation")
    }
}

// ---------------------------------------------------------------------------
// Service references
// ---------------------------------------------------------------------------

/// Accumulates which of a producer's endpoints a consumer references.
///
/// The first reference from a consumer to a given producer creates this
/// annotation and registers the single environment callback for that
/// producer; later references only extend the name set. Whole-resource
/// references flip `use_all_endpoints`. This is what keeps emitted indices
/// continuous per producer and lets scheme-conflict grouping span every
/// referenced endpoint.
pub struct ServiceReferenceAnnotation {
    producer: Arc<Resource>,
    use_all_endpoints: AtomicBool,
    endpoint_names: Mutex<Vec<String>>,
}

impl ServiceReferenceAnnotation {
    pub fn new(producer: Arc<Resource>) -> Self {
        Self {
            producer,
            use_all_endpoints: AtomicBool::new(false),
            endpoint_names: Mutex::new(Vec::new()),
        }
    }

    pub fn producer(&self) -> &Arc<Resource> {
        &self.producer
    }

    pub fn use_all_endpoints(&self) -> bool {
        self.use_all_endpoints.load(Ordering::Acquire)
    }

    pub fn set_use_all_endpoints(&self) {
        self.use_all_endpoints.store(true, Ordering::Release);
    }

    pub fn add_endpoint_name(&self, name: &str) {
        let mut names = self
            .endpoint_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    /// Whether the given endpoint participates in this reference.
    pub fn selects(&self, endpoint_name: &str) -> bool {
        self.use_all_endpoints()
            || self
                .endpoint_names
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .any(|n| n == endpoint_name)
    }
}

impl std::fmt::Debug for ServiceReferenceAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceReferenceAnnotation")
            .field("producer", &self.producer.name())
            .field("use_all_endpoints", &self.use_all_endpoints())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// A graph edge to another resource, with a relation type tag and an open
/// property map. Metadata only; resolution never traverses these, so cycles
/// are tolerated.
#[derive(Clone)]
pub struct RelationshipAnnotation {
    target: Arc<Resource>,
    relationship_type: String,
    properties: BTreeMap<String, serde_json::Value>,
}

impl RelationshipAnnotation {
    pub fn new(target: Arc<Resource>, relationship_type: impl Into<String>) -> Self {
        Self {
            target,
            relationship_type: relationship_type.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn target(&self) -> &Arc<Resource> {
        &self.target
    }

    pub fn relationship_type(&self) -> &str {
        &self.relationship_type
    }

    pub fn properties(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.properties
    }

    pub fn to_snapshot(&self) -> RelationshipSnapshot {
        RelationshipSnapshot {
            resource_name: self.target.name().to_string(),
            relationship_type: self.relationship_type.clone(),
            properties: self.properties.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Deployment targets
// ---------------------------------------------------------------------------

/// Marks that, in Publish mode, this resource's manifest representation is
/// substituted by a synthesized infrastructure resource.
#[derive(Clone)]
pub struct DeploymentTargetAnnotation {
    target: Arc<Resource>,
}

impl DeploymentTargetAnnotation {
    pub fn new(target: Arc<Resource>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &Arc<Resource> {
        &self.target
    }
}

// ---------------------------------------------------------------------------
// Connection strings
// ---------------------------------------------------------------------------

type ConnectionStringProvider = dyn Fn() -> Option<String> + Send + Sync;

/// Marks a resource as exposing a connection string. The value is produced by
/// a provider so it can be computed late, e.g. from an allocated endpoint.
#[derive(Clone)]
pub struct ConnectionStringAnnotation {
    provider: Arc<ConnectionStringProvider>,
}

impl ConnectionStringAnnotation {
    pub fn new(provider: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(move || Some(value.clone()))
    }

    pub fn get(&self) -> Option<String> {
        (self.provider)()
    }
}

impl std::fmt::Debug for ConnectionStringAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConnectionStringAnnotation")
    }
}
