//! End-to-end tests: TOML definition → model → allocation → resolution

use stagehand::appdef::AppDefinition;
use stagehand::sim::{self, SimExecutor};
use stagehand_commands::{execute_command, START_COMMAND, STOP_COMMAND};
use stagehand_core::{Error, ExecutionContext, ResourceExecutor, WireResource};
use stagehand_resolve::resolve_environment;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const SHOP_APP: &str = r#"
[app]
name = "shop"

[[resource]]
name = "postgres"
connection_string = "Host=localhost;Database=shop"

[[resource]]
name = "api"
lifecycle_commands = true
endpoints = [{ name = "http", scheme = "http", target_port = 8080 }]
references = ["postgres"]

[[resource]]
name = "web"
lifecycle_commands = true
endpoints = [{ name = "http", scheme = "http" }]
endpoint_references = [{ resource = "api", endpoint = "http" }]
url_references = [{ name = "petstore", url = "https://petstore.swagger.io/" }]
"#;

#[test]
fn run_model_resolves_references_end_to_end() {
    let definition = AppDefinition::parse(SHOP_APP).unwrap();
    assert_eq!(definition.app.name.as_deref(), Some("shop"));

    let execution = ExecutionContext::run();
    let model = definition.build_model(execution).unwrap();
    sim::allocate_all(&model, 52000).unwrap();

    let api = model.resource("api").unwrap();
    let env = resolve_environment(api, execution).unwrap();
    assert_eq!(
        env["ConnectionStrings__postgres"],
        "Host=localhost;Database=shop"
    );

    let web = model.resource("web").unwrap();
    let env = resolve_environment(web, execution).unwrap();
    assert_eq!(env["services__api__0"], "http://localhost:8080");
    assert_eq!(env["services__api__1"], "http://localhost:8080");
    assert_eq!(env["services__petstore"], "https://petstore.swagger.io/");
}

#[test]
fn allocate_all_uses_target_ports_and_sequential_fallback() {
    let definition = AppDefinition::parse(SHOP_APP).unwrap();
    let model = definition.build_model(ExecutionContext::run()).unwrap();
    sim::allocate_all(&model, 52000).unwrap();

    let api_http = model.resource("api").unwrap().endpoint("http").unwrap();
    assert_eq!(api_http.allocated().unwrap().port, 8080);

    // web's endpoint declares no target port and falls back to the base.
    let web_http = model.resource("web").unwrap().endpoint("http").unwrap();
    assert_eq!(web_http.allocated().unwrap().port, 52000);
}

#[test]
fn publish_model_defers_connection_strings() {
    let definition = AppDefinition::parse(SHOP_APP).unwrap();
    let execution = ExecutionContext::publish();
    let model = definition.build_model(execution).unwrap();

    let api = model.resource("api").unwrap();
    let env = resolve_environment(api, execution).unwrap();
    assert_eq!(
        env["ConnectionStrings__postgres"],
        "{postgres.connectionString}"
    );

    let web = model.resource("web").unwrap();
    let env = resolve_environment(web, execution).unwrap();
    assert_eq!(env["services__api__0"], "{api.bindings.http.url}");
}

#[test]
fn deployment_target_substitutes_in_publish_mode() {
    let definition = AppDefinition::parse(
        r#"
[[resource]]
name = "aca-env"

[[resource]]
name = "api"
deployment_target = "aca-env"
"#,
    )
    .unwrap();
    let model = definition
        .build_model(ExecutionContext::publish())
        .unwrap();
    let api = model.resource("api").unwrap();
    assert_eq!(api.deployment_target().unwrap().name(), "aca-env");
}

#[test]
fn unknown_reference_target_fails_model_construction() {
    let definition = AppDefinition::parse(
        r#"
[[resource]]
name = "api"
references = ["missing"]
"#,
    )
    .unwrap();
    let err = definition
        .build_model(ExecutionContext::run())
        .unwrap_err();
    assert!(err.to_string().contains("unknown resource `missing`"));
}

#[test]
fn bad_literal_reference_fails_model_construction() {
    let definition = AppDefinition::parse(
        r#"
[[resource]]
name = "api"
url_references = [{ name = "petstore", url = "petstore.swagger.io" }]
"#,
    )
    .unwrap();
    assert!(definition.build_model(ExecutionContext::run()).is_err());
}

#[tokio::test]
async fn sim_executor_tracks_lifecycle_state() {
    let definition = AppDefinition::parse(SHOP_APP).unwrap();
    let execution = ExecutionContext::run();
    let model = definition.build_model(execution).unwrap();
    sim::allocate_all(&model, 52000).unwrap();

    let executor = Arc::new(SimExecutor::new());
    let api = model.resource("api").unwrap();

    execute_command(api, START_COMMAND, executor.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(executor.state("api").as_deref(), Some("Running"));

    execute_command(api, STOP_COMMAND, executor.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(executor.state("api").as_deref(), Some("Exited"));
}

#[tokio::test]
async fn sim_executor_honors_cancellation() {
    let executor = SimExecutor::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = executor.start_resource("api", cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(executor.state("api").is_none());
}

#[tokio::test]
async fn wire_projection_of_a_running_resource() {
    let definition = AppDefinition::parse(SHOP_APP).unwrap();
    let execution = ExecutionContext::run();
    let model = definition.build_model(execution).unwrap();
    sim::allocate_all(&model, 52000).unwrap();

    let web = model.resource("web").unwrap();
    let env = resolve_environment(web, execution).unwrap();
    let snapshot = sim::snapshot(web, Some("Running"), &env);
    let wire = WireResource::from_snapshot(&snapshot);

    assert_eq!(wire.name, "web");
    assert_eq!(wire.state, "Running");
    assert!(wire.created_at.is_some());
    assert!(wire
        .environment
        .iter()
        .any(|e| e.name == "services__api__0"));
    assert!(wire.urls.iter().any(|u| u.full_url == "http://localhost:52000"));
}
