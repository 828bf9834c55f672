//! Stagehand Commands - the command lifecycle state machine
//!
//! Commands compute their UI affordance (enabled, disabled, hidden) from a
//! resource's latest status snapshot and drive an external executor to change
//! that status. States are classifications of snapshot text, recomputed on
//! every snapshot change, never stored.

pub mod execute;
pub mod lifecycle;
pub mod states;

pub use execute::{evaluate_commands, execute_command, CommandStateEntry};
pub use lifecycle::{LifecycleCommandsExt, RESTART_COMMAND, START_COMMAND, STOP_COMMAND};
