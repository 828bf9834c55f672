//! Tests for stagehand-model: resources, annotations, endpoints, builders

use stagehand_core::{Error, ExecutionContext, ResourceSnapshot};
use stagehand_model::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn noop_command(command_type: &str) -> CommandAnnotation {
    CommandAnnotation::new(
        command_type,
        "Noop",
        |_| CommandState::Enabled,
        |_| Box::pin(async { Ok(()) }),
        None,
        false,
    )
}

// ===========================================================================
// AppModelBuilder
// ===========================================================================

#[test]
fn add_resource_rejects_duplicate_names() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    builder.add_resource("api").unwrap();
    let err = builder.add_resource("api").unwrap_err();
    assert!(matches!(err, Error::DuplicateResource(name) if name == "api"));
}

#[test]
fn resource_names_are_case_sensitive() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    builder.add_resource("api").unwrap();
    builder.add_resource("Api").unwrap();
    let model = builder.build();
    assert!(model.resource("api").is_some());
    assert!(model.resource("Api").is_some());
    assert!(model.resource("API").is_none());
}

#[test]
fn model_preserves_resource_order() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    builder.add_resource("postgres").unwrap();
    builder.add_resource("api").unwrap();
    builder.add_resource("web").unwrap();
    let model = builder.build();
    let names: Vec<_> = model.resources().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["postgres", "api", "web"]);
}

#[test]
fn builder_clones_share_the_resource() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder.add_resource("api").unwrap();
    let clone = rb.clone();
    clone.with_endpoint("http", "http", None);
    assert_eq!(rb.resource().endpoints().len(), 1);
}

// ===========================================================================
// Annotations
// ===========================================================================

#[test]
fn endpoints_keep_insertion_order() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("api")
        .unwrap()
        .with_endpoint("http", "http", Some(8080))
        .with_endpoint("https", "https", Some(8443))
        .with_endpoint("admin", "http", None);
    let names: Vec<_> = rb
        .resource()
        .endpoints()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["http", "https", "admin"]);
}

#[test]
fn endpoint_lookup_by_name() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("api")
        .unwrap()
        .with_endpoint("http", "http", Some(8080));
    let endpoint = rb.resource().endpoint("http").unwrap();
    assert_eq!(endpoint.scheme(), "http");
    assert_eq!(endpoint.target_port(), Some(8080));
    assert!(rb.resource().endpoint("missing").is_none());
}

#[test]
fn duplicate_command_type_fails_loudly() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("api")
        .unwrap()
        .with_command(noop_command("migrate"))
        .unwrap();
    let err = rb.with_command(noop_command("migrate")).unwrap_err();
    assert!(matches!(
        err,
        Error::DuplicateCommand { resource, command }
            if resource == "api" && command == "migrate"
    ));
}

#[test]
fn distinct_command_types_coexist() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("api")
        .unwrap()
        .with_command(noop_command("migrate"))
        .unwrap()
        .with_command(noop_command("seed"))
        .unwrap();
    let types: Vec<_> = rb
        .resource()
        .commands()
        .iter()
        .map(|c| c.command_type().to_string())
        .collect();
    assert_eq!(types, vec!["migrate", "seed"]);
    assert!(rb.resource().command("seed").is_some());
    assert!(rb.resource().command("deploy").is_none());
}

#[test]
fn command_evaluate_uses_the_snapshot() {
    let command = CommandAnnotation::new(
        "probe",
        "Probe",
        |snapshot| {
            if snapshot.state_text() == Some("Running") {
                CommandState::Enabled
            } else {
                CommandState::Hidden
            }
        },
        |_| Box::pin(async { Ok(()) }),
        Some("Pulse"),
        true,
    );
    let running = ResourceSnapshot::new("api", "service").with_state("Running");
    let stopped = ResourceSnapshot::new("api", "service").with_state("Exited");
    assert_eq!(command.evaluate(&running), CommandState::Enabled);
    assert_eq!(command.evaluate(&stopped), CommandState::Hidden);
    assert_eq!(command.icon_name(), Some("Pulse"));
    assert!(command.is_highlighted());
}

// ===========================================================================
// Connection strings
// ===========================================================================

#[test]
fn connection_string_from_value() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("postgres")
        .unwrap()
        .with_connection_string("Host=localhost;Database=shop");
    assert!(rb.resource().has_connection_string());
    assert_eq!(
        rb.resource().connection_string().as_deref(),
        Some("Host=localhost;Database=shop")
    );
}

#[test]
fn connection_string_provider_can_yield_nothing() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("vault")
        .unwrap()
        .with_connection_string_provider(|| None);
    assert!(rb.resource().has_connection_string());
    assert!(rb.resource().connection_string().is_none());
}

#[test]
fn connection_string_last_registration_wins() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("postgres")
        .unwrap()
        .with_connection_string("first")
        .with_connection_string("second");
    assert_eq!(rb.resource().connection_string().as_deref(), Some("second"));
}

#[test]
fn connection_string_provider_is_invoked_lazily() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("postgres")
        .unwrap()
        .with_connection_string_provider(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some("value".into())
        });
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    rb.resource().connection_string();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ===========================================================================
// Relationships and deployment targets
// ===========================================================================

#[test]
fn relationship_projects_into_snapshot_form() {
    let target = Arc::new(Resource::new("postgres"));
    let annotation = RelationshipAnnotation::new(target, "Reference")
        .with_property("weight", serde_json::json!(2));
    let snapshot = annotation.to_snapshot();
    assert_eq!(snapshot.resource_name, "postgres");
    assert_eq!(snapshot.relationship_type, "Reference");
    assert_eq!(snapshot.properties["weight"], serde_json::json!(2));
}

#[test]
fn relationship_cycles_are_tolerated() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let a = builder.add_resource("a").unwrap();
    let b = builder.add_resource("b").unwrap();
    let a = a.with_relationship(b.resource(), "Reference");
    let _b = b.with_relationship(a.resource(), "Reference");
    assert_eq!(a.resource().relationships().len(), 1);
}

#[test]
fn deployment_target_last_registration_wins() {
    let first = Arc::new(Resource::new("aca-env-1"));
    let second = Arc::new(Resource::new("aca-env-2"));
    let mut builder = AppModelBuilder::new(ExecutionContext::publish());
    let rb = builder
        .add_resource("api")
        .unwrap()
        .with_deployment_target(first)
        .with_deployment_target(second);
    assert_eq!(
        rb.resource().deployment_target().unwrap().name(),
        "aca-env-2"
    );
}

#[test]
fn deployment_target_absent_by_default() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder.add_resource("api").unwrap();
    assert!(rb.resource().deployment_target().is_none());
}

// ===========================================================================
// Endpoint allocation
// ===========================================================================

#[test]
fn allocation_happens_at_most_once() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder
        .add_resource("api")
        .unwrap()
        .with_endpoint("http", "http", Some(8080));
    let resource = rb.resource();

    resource
        .allocate_endpoint(
            ExecutionContext::run(),
            "http",
            AllocatedEndpoint::new("localhost", 52000, "http"),
        )
        .unwrap();
    let endpoint = resource.endpoint("http").unwrap();
    assert_eq!(
        endpoint.allocated().unwrap().uri(),
        "http://localhost:52000"
    );

    let err = resource
        .allocate_endpoint(
            ExecutionContext::run(),
            "http",
            AllocatedEndpoint::new("localhost", 52001, "http"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyAllocated { .. }));
    // The original allocation is untouched.
    assert_eq!(endpoint.allocated().unwrap().port, 52000);
}

#[test]
fn allocation_is_rejected_in_publish_mode() {
    let mut builder = AppModelBuilder::new(ExecutionContext::publish());
    let rb = builder
        .add_resource("api")
        .unwrap()
        .with_endpoint("http", "http", None);
    let err = rb
        .resource()
        .allocate_endpoint(
            ExecutionContext::publish(),
            "http",
            AllocatedEndpoint::new("localhost", 52000, "http"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(!rb.resource().endpoint("http").unwrap().is_allocated());
}

#[test]
fn allocation_of_unknown_endpoint_fails() {
    let mut builder = AppModelBuilder::new(ExecutionContext::run());
    let rb = builder.add_resource("api").unwrap();
    let err = rb
        .resource()
        .allocate_endpoint(
            ExecutionContext::run(),
            "http",
            AllocatedEndpoint::new("localhost", 52000, "http"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnknownEndpoint { .. }));
}

#[test]
fn allocated_endpoint_uri_forms() {
    let allocated = AllocatedEndpoint::new("localhost", 2000, "https");
    assert_eq!(allocated.uri(), "https://localhost:2000");
    assert_eq!(
        allocated.name_qualified_uri("mybinding"),
        "mybinding://localhost:2000"
    );
}
