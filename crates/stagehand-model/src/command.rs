//! Command annotations - user-invocable operations attached to a resource
//!
//! A command's UI state is recomputed from the latest snapshot by a pure
//! evaluator; its effect runs through an explicitly passed executor. The
//! evaluator must never block or perform I/O.

use crate::resource::Resource;
use futures::future::BoxFuture;
use stagehand_core::{ResourceExecutor, ResourceSnapshot, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// UI affordance derived from a resource's latest snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandState {
    Enabled,
    Disabled,
    Hidden,
}

impl std::fmt::Display for CommandState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Hidden => write!(f, "hidden"),
        }
    }
}

/// Everything a command executor function receives. The executor is an
/// explicit parameter; there is no service locator.
pub struct ExecuteCommandContext {
    pub executor: Arc<dyn ResourceExecutor>,
    pub resource_name: String,
    pub cancel: CancellationToken,
}

pub type CommandFuture = BoxFuture<'static, Result<()>>;

type StateEvaluator = dyn Fn(&ResourceSnapshot) -> CommandState + Send + Sync;
type ExecuteFn = dyn Fn(ExecuteCommandContext) -> CommandFuture + Send + Sync;

/// A command attached to a resource. The type tag is unique per resource.
pub struct CommandAnnotation {
    command_type: String,
    display_name: String,
    icon_name: Option<String>,
    is_highlighted: bool,
    update_state: Box<StateEvaluator>,
    execute_fn: Box<ExecuteFn>,
}

impl CommandAnnotation {
    pub fn new(
        command_type: impl Into<String>,
        display_name: impl Into<String>,
        update_state: impl Fn(&ResourceSnapshot) -> CommandState + Send + Sync + 'static,
        execute: impl Fn(ExecuteCommandContext) -> CommandFuture + Send + Sync + 'static,
        icon_name: Option<&str>,
        is_highlighted: bool,
    ) -> Self {
        Self {
            command_type: command_type.into(),
            display_name: display_name.into(),
            icon_name: icon_name.map(String::from),
            is_highlighted,
            update_state: Box::new(update_state),
            execute_fn: Box::new(execute),
        }
    }

    pub fn command_type(&self) -> &str {
        &self.command_type
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon_name(&self) -> Option<&str> {
        self.icon_name.as_deref()
    }

    pub fn is_highlighted(&self) -> bool {
        self.is_highlighted
    }

    /// Recomputes the UI state from a snapshot. Pure; safe to call on every
    /// status change.
    pub fn evaluate(&self, snapshot: &ResourceSnapshot) -> CommandState {
        (self.update_state)(snapshot)
    }

    /// Starts the command's effect. The returned future is awaited by the
    /// caller; failures propagate unchanged.
    pub fn execute(&self, context: ExecuteCommandContext) -> CommandFuture {
        (self.execute_fn)(context)
    }

    /// Convenience over [`execute`](Self::execute) for a known resource.
    pub fn execute_for(
        &self,
        resource: &Resource,
        executor: Arc<dyn ResourceExecutor>,
        cancel: CancellationToken,
    ) -> CommandFuture {
        self.execute(ExecuteCommandContext {
            executor,
            resource_name: resource.name().to_string(),
            cancel,
        })
    }
}

impl std::fmt::Debug for CommandAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandAnnotation")
            .field("command_type", &self.command_type)
            .field("display_name", &self.display_name)
            .finish()
    }
}
