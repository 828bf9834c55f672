//! Reference declaration - projecting a producer's endpoints and secrets into
//! a consumer's environment
//!
//! Variable naming is a fixed contract:
//!   services__<producer>__<n>   endpoint references, n assigned in emission order
//!   ConnectionStrings__<name>   connection-string references (key overridable)
//!   services__<name>            literal URI references

use stagehand_core::{Error, Result};
use stagehand_model::{
    Annotation, EnvCallbackContext, EnvironmentCallbackAnnotation, Resource, ResourceBuilder,
    ServiceReferenceAnnotation,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Options for a connection-string reference.
#[derive(Clone, Debug, Default)]
pub struct ConnectionRefOptions {
    /// Full environment key to use instead of `ConnectionStrings__<name>`.
    pub key: Option<String>,
    /// Optional references emit nothing when the value is missing instead of
    /// failing the resolution pass.
    pub optional: bool,
}

/// Reference declaration methods on [`ResourceBuilder`].
pub trait ReferenceExt: Sized {
    /// References a producer resource as a whole. A producer exposing a
    /// connection string yields a connection-string reference with default
    /// options; anything else yields a service reference covering all of the
    /// producer's endpoints.
    fn with_reference(self, producer: &Arc<Resource>) -> Self;

    /// References a single named endpoint on a producer.
    fn with_endpoint_reference(self, producer: &Arc<Resource>, endpoint: &str) -> Self;

    /// References a producer's connection string.
    fn with_connection_reference(
        self,
        producer: &Arc<Resource>,
        options: ConnectionRefOptions,
    ) -> Self;

    /// References an external service by a literal URI. The URI must be
    /// absolute, http or https, and rooted at `/`; anything else is a
    /// configuration error raised here, not at resolution time.
    fn with_url_reference(self, name: &str, url: &str) -> Result<Self>;
}

impl ReferenceExt for ResourceBuilder {
    fn with_reference(self, producer: &Arc<Resource>) -> Self {
        if producer.has_connection_string() {
            return self.with_connection_reference(producer, ConnectionRefOptions::default());
        }
        let reference = service_reference(&self, producer);
        reference.set_use_all_endpoints();
        debug!(
            consumer = %self.resource().name(),
            producer = %producer.name(),
            "service reference (all endpoints)"
        );
        self
    }

    fn with_endpoint_reference(self, producer: &Arc<Resource>, endpoint: &str) -> Self {
        let reference = service_reference(&self, producer);
        reference.add_endpoint_name(endpoint);
        debug!(
            consumer = %self.resource().name(),
            producer = %producer.name(),
            endpoint,
            "endpoint reference"
        );
        self
    }

    fn with_connection_reference(
        self,
        producer: &Arc<Resource>,
        options: ConnectionRefOptions,
    ) -> Self {
        let producer = producer.clone();
        let optional = options.optional;
        let key = options
            .key
            .unwrap_or_else(|| format!("ConnectionStrings__{}", producer.name()));
        debug!(
            consumer = %self.resource().name(),
            producer = %producer.name(),
            key = %key,
            optional,
            "connection-string reference"
        );
        self.with_environment(move |context| {
            // The mode decides the whole strategy, so branch exactly once.
            if context.execution.is_publish() {
                context.env.insert(
                    key.clone(),
                    format!("{{{}.connectionString}}", producer.name()),
                );
                return Ok(());
            }
            match producer.connection_string() {
                Some(value) => {
                    context.env.insert(key.clone(), value);
                    Ok(())
                }
                None if optional => Ok(()),
                None => Err(Error::MissingConnectionString(producer.name().to_string())),
            }
        })
    }

    fn with_url_reference(self, name: &str, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| {
            Error::configuration(format!(
                "literal reference `{name}` requires an absolute URI: {e}"
            ))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::configuration(format!(
                "literal reference `{name}` requires an http or https URI, got `{}`",
                parsed.scheme()
            )));
        }
        if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(Error::configuration(format!(
                "literal reference `{name}` requires a root URI, got `{url}`"
            )));
        }
        let key = format!("services__{name}");
        let value = parsed.to_string();
        debug!(consumer = %self.resource().name(), key = %key, value = %value, "literal reference");
        Ok(self.with_environment(move |context| {
            context.env.insert(key.clone(), value.clone());
            Ok(())
        }))
    }
}

/// Finds or creates the accumulated service reference from the consumer to
/// the producer. Only the first reference registers the environment callback;
/// later ones extend the same annotation, which keeps emitted indices
/// continuous and conflict grouping spanning the whole referenced set.
fn service_reference(
    builder: &ResourceBuilder,
    producer: &Arc<Resource>,
) -> Arc<ServiceReferenceAnnotation> {
    let consumer = builder.resource();
    if let Some(existing) = consumer.service_reference_to(producer.name()) {
        return existing;
    }
    let reference = Arc::new(ServiceReferenceAnnotation::new(producer.clone()));
    consumer.add_annotation(Annotation::ServiceReference(reference.clone()));
    let callback_ref = reference.clone();
    consumer.add_annotation(Annotation::EnvironmentCallback(
        EnvironmentCallbackAnnotation::new(move |context| {
            populate_service_reference(&callback_ref, context)
        }),
    ));
    reference
}

/// Emits `services__<producer>__<n>` variables for every selected endpoint.
///
/// Run mode considers allocated endpoints only, in annotation order. Each
/// gets a name-qualified variable; an endpoint whose scheme group (within the
/// referenced set) has exactly one member also gets a real-scheme variable.
/// A conflicting group loses the real-scheme variant for all of its members.
/// Publish mode defers every selected declared endpoint to a
/// `{<producer>.bindings.<endpoint>.url}` expression instead.
fn populate_service_reference(
    reference: &ServiceReferenceAnnotation,
    context: &mut EnvCallbackContext<'_>,
) -> Result<()> {
    let producer = reference.producer();
    let name = producer.name();

    if context.execution.is_publish() {
        let mut index = 0;
        for endpoint in producer.endpoints() {
            if !reference.selects(endpoint.name()) {
                continue;
            }
            context.env.insert(
                format!("services__{name}__{index}"),
                format!("{{{name}.bindings.{}.url}}", endpoint.name()),
            );
            index += 1;
        }
        return Ok(());
    }

    let selected: Vec<_> = producer
        .endpoints()
        .into_iter()
        .filter(|endpoint| reference.selects(endpoint.name()))
        .filter_map(|endpoint| {
            let allocated = endpoint.allocated().cloned();
            allocated.map(|allocated| (endpoint, allocated))
        })
        .collect();

    let mut scheme_counts: BTreeMap<String, usize> = BTreeMap::new();
    for (_, allocated) in &selected {
        *scheme_counts.entry(allocated.scheme.clone()).or_insert(0) += 1;
    }

    let mut index = 0;
    for (endpoint, allocated) in &selected {
        context.env.insert(
            format!("services__{name}__{index}"),
            allocated.name_qualified_uri(endpoint.name()),
        );
        index += 1;
        if scheme_counts.get(&allocated.scheme).copied() == Some(1) {
            context
                .env
                .insert(format!("services__{name}__{index}"), allocated.uri());
            index += 1;
        }
    }
    Ok(())
}
