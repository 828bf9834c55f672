//! stagehand - local distributed-application orchestrator runtime model
//!
//! Usage:
//!   stagehand run app.toml       → build the graph, allocate endpoints,
//!                                  start everything, show the status board
//!   stagehand publish app.toml   → build the graph, emit deferred
//!                                  environment expressions
//!   stagehand version            → show version

use clap::{Parser, Subcommand};
use stagehand::appdef::AppDefinition;
use stagehand::sim::{self, SimExecutor};
use stagehand_commands::{evaluate_commands, execute_command, START_COMMAND};
use stagehand_core::{ExecutionContext, WireResource};
use stagehand_resolve::resolve_environment;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "stagehand",
    about = "Runtime model of a local distributed-application orchestrator",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the live model: allocate endpoints, start resources, show state
    Run {
        /// Application definition (TOML)
        file: PathBuf,
        /// First port for endpoints without a target port
        #[arg(long, default_value_t = 52000)]
        base_port: u16,
        /// Emit wire-format JSON instead of the text board
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Emit the deferred environment expressions used at deployment time
    Publish {
        /// Application definition (TOML)
        file: PathBuf,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            base_port,
            json,
        } => run(&file, base_port, json).await,
        Commands::Publish { file } => publish(&file),
        Commands::Version => {
            println!("stagehand v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stagehand=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(file: &Path, base_port: u16, json: bool) -> anyhow::Result<()> {
    let definition = AppDefinition::load(file)?;
    let execution = ExecutionContext::run();
    let model = definition.build_model(execution)?;
    sim::allocate_all(&model, base_port)?;

    let executor = Arc::new(SimExecutor::new());
    let cancel = CancellationToken::new();

    let mut wire = Vec::new();
    for resource in model.resources() {
        let env = resolve_environment(resource, execution)?;

        // Resources without a start command are passive (values, secrets).
        if resource.command(START_COMMAND).is_some() {
            execute_command(resource, START_COMMAND, executor.clone(), cancel.clone()).await?;
        }

        let state = executor.state(resource.name());
        let snapshot = sim::snapshot(resource, state.as_deref(), &env);

        if json {
            wire.push(WireResource::from_snapshot(&snapshot));
            continue;
        }

        println!("{} [{}]", resource.name(), state.as_deref().unwrap_or("-"));
        for url in &snapshot.urls {
            println!("    url  {} = {}", url.name, url.url);
        }
        for (key, value) in &env {
            println!("    env  {key} = {value}");
        }
        for entry in evaluate_commands(resource, &snapshot) {
            println!("    cmd  {} [{}]", entry.command_type, entry.state);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&wire)?);
    }
    Ok(())
}

fn publish(file: &Path) -> anyhow::Result<()> {
    let definition = AppDefinition::load(file)?;
    let execution = ExecutionContext::publish();
    let model = definition.build_model(execution)?;

    for resource in model.resources() {
        // A deployment target replaces the resource's own manifest shape.
        match resource.deployment_target() {
            Some(target) => println!("{} -> {}", resource.name(), target.name()),
            None => println!("{}", resource.name()),
        }
        let env = resolve_environment(resource, execution)?;
        for (key, value) in &env {
            println!("    env  {key} = {value}");
        }
    }
    Ok(())
}
