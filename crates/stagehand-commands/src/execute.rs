//! Command evaluation and dispatch

use stagehand_core::{Error, ResourceExecutor, ResourceSnapshot, Result};
use stagehand_model::{CommandState, Resource};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A command's evaluated UI state plus its display metadata.
#[derive(Clone, Debug)]
pub struct CommandStateEntry {
    pub command_type: String,
    pub display_name: String,
    pub state: CommandState,
    pub icon_name: Option<String>,
    pub is_highlighted: bool,
}

/// Evaluates every command on the resource against the latest snapshot, in
/// annotation order. Evaluators are pure; this can run on every change.
pub fn evaluate_commands(resource: &Resource, snapshot: &ResourceSnapshot) -> Vec<CommandStateEntry> {
    resource
        .commands()
        .iter()
        .map(|command| CommandStateEntry {
            command_type: command.command_type().to_string(),
            display_name: command.display_name().to_string(),
            state: command.evaluate(snapshot),
            icon_name: command.icon_name().map(String::from),
            is_highlighted: command.is_highlighted(),
        })
        .collect()
}

/// Runs a command by type tag against the given executor. Executor failures
/// propagate unchanged.
pub async fn execute_command(
    resource: &Resource,
    command_type: &str,
    executor: Arc<dyn ResourceExecutor>,
    cancel: CancellationToken,
) -> Result<()> {
    let command = resource
        .command(command_type)
        .ok_or_else(|| Error::CommandNotFound {
            resource: resource.name().to_string(),
            command: command_type.to_string(),
        })?;
    info!(resource = %resource.name(), command = command_type, "command executing");
    let result = command.execute_for(resource, executor, cancel).await;
    match &result {
        Ok(_) => info!(resource = %resource.name(), command = command_type, "command ok"),
        Err(e) => {
            warn!(resource = %resource.name(), command = command_type, error = %e, "command failed")
        }
    }
    result
}
