//! Stagehand Core - execution context, snapshots, wire projection, error handling

pub mod context;
pub mod error;
pub mod executor;
pub mod snapshot;
pub mod wire;

pub use context::{ExecutionContext, Operation};
pub use error::{Error, Result};
pub use executor::ResourceExecutor;
pub use snapshot::*;
pub use wire::*;
