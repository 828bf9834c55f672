//! Stagehand Model - the resource/annotation graph and its builders
//!
//! A resource is a named unit in the application graph carrying an ordered,
//! append-only collection of typed annotations. Annotation insertion order is
//! authoritative: downstream resolution assigns sequential indices from it.

pub mod annotation;
pub mod builder;
pub mod command;
pub mod endpoint;
pub mod resource;

pub use annotation::{
    Annotation, ConnectionStringAnnotation, DeploymentTargetAnnotation, EnvCallbackContext,
    EnvironmentCallbackAnnotation, RelationshipAnnotation, ServiceReferenceAnnotation,
};
pub use builder::{AppModel, AppModelBuilder, ResourceBuilder};
pub use command::{CommandAnnotation, CommandFuture, CommandState, ExecuteCommandContext};
pub use endpoint::{AllocatedEndpoint, EndpointAnnotation};
pub use resource::Resource;
