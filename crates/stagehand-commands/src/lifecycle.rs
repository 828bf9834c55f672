//! Built-in lifecycle commands - start, stop, restart

use crate::states;
use stagehand_core::{Error, Result};
use stagehand_model::{CommandAnnotation, CommandState, ExecuteCommandContext, ResourceBuilder};

pub const START_COMMAND: &str = "start";
pub const STOP_COMMAND: &str = "stop";
pub const RESTART_COMMAND: &str = "restart";

/// Attaches the three built-in lifecycle commands to a resource.
pub trait LifecycleCommandsExt: Sized {
    fn with_lifecycle_commands(self) -> Result<Self>;
}

impl LifecycleCommandsExt for ResourceBuilder {
    fn with_lifecycle_commands(self) -> Result<Self> {
        self.with_command(CommandAnnotation::new(
            START_COMMAND,
            "Start",
            |snapshot| {
                let state = snapshot.state_text();
                if states::is_starting(state) {
                    CommandState::Disabled
                } else if states::is_stopped(state) {
                    CommandState::Enabled
                } else {
                    CommandState::Hidden
                }
            },
            |context| {
                Box::pin(async move {
                    let ExecuteCommandContext {
                        executor,
                        resource_name,
                        cancel,
                    } = context;
                    executor.start_resource(&resource_name, cancel).await
                })
            },
            Some("Play"),
            true,
        ))?
        .with_command(CommandAnnotation::new(
            STOP_COMMAND,
            "Stop",
            |snapshot| {
                let state = snapshot.state_text();
                if states::is_stopping(state) {
                    CommandState::Disabled
                } else if !states::is_stopped(state) && !states::is_starting(state) {
                    CommandState::Enabled
                } else {
                    CommandState::Hidden
                }
            },
            |context| {
                Box::pin(async move {
                    let ExecuteCommandContext {
                        executor,
                        resource_name,
                        cancel,
                    } = context;
                    executor.stop_resource(&resource_name, cancel).await
                })
            },
            Some("Stop"),
            true,
        ))?
        .with_command(CommandAnnotation::new(
            RESTART_COMMAND,
            "Restart",
            |snapshot| {
                let state = snapshot.state_text();
                if states::is_starting(state)
                    || states::is_stopping(state)
                    || states::is_stopped(state)
                {
                    CommandState::Disabled
                } else {
                    CommandState::Enabled
                }
            },
            |context| {
                Box::pin(async move {
                    let ExecuteCommandContext {
                        executor,
                        resource_name,
                        cancel,
                    } = context;
                    // Sequential, never concurrent: a stop failure suppresses
                    // the start and propagates unchanged.
                    executor
                        .stop_resource(&resource_name, cancel.clone())
                        .await?;
                    if cancel.is_cancelled() {
                        return Err(Error::cancelled(format!(
                            "restart of `{resource_name}` cancelled after stop"
                        )));
                    }
                    executor.start_resource(&resource_name, cancel).await
                })
            },
            Some("ArrowCounterclockwise"),
            false,
        ))
    }
}
