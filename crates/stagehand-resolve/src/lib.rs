//! Stagehand Resolve - the reference resolution engine
//!
//! A reference is a declared dependency from one resource's configuration on
//! another resource's endpoints, connection string, or a literal URI. It is
//! not materialized as a persistent object: declaring one immediately
//! registers environment callbacks on the consumer, and a later resolution
//! pass invokes those callbacks to synthesize the consumer's environment.

pub mod environment;
pub mod reference;

pub use environment::resolve_environment;
pub use reference::{ConnectionRefOptions, ReferenceExt};
