//! Stagehand - runtime model of a local distributed-application orchestrator
//!
//! The library crates carry the model (`stagehand-model`), the reference
//! resolution engine (`stagehand-resolve`), and the command lifecycle state
//! machine (`stagehand-commands`). This crate wires them into a CLI: a TOML
//! application definition becomes a resource graph that can be resolved for
//! live orchestration or for manifest publishing.

pub mod appdef;
pub mod sim;
