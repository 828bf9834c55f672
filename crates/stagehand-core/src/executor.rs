//! Executor boundary - starting and stopping resources belongs to an external component
//!
//! The core never spawns a process or container itself. Commands call through
//! this trait; the session wires in a real executor (or a simulated one).

use crate::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// External component that changes a resource's runtime state.
///
/// Implementations must honor the cancellation token: an operation aborted by
/// the token returns before its effect completes.
#[async_trait]
pub trait ResourceExecutor: Send + Sync {
    async fn start_resource(&self, name: &str, cancel: CancellationToken) -> Result<()>;

    async fn stop_resource(&self, name: &str, cancel: CancellationToken) -> Result<()>;
}
