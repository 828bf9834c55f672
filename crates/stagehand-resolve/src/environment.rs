//! Environment resolution pass - runs a resource's callbacks against a fresh map

use stagehand_core::{ExecutionContext, Result};
use stagehand_model::{EnvCallbackContext, Resource};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the environment for one resource by invoking its environment
/// callbacks in annotation order against a fresh map.
///
/// The pass owns the map exclusively while it runs. Callbacks only read graph
/// state, so re-running the pass yields the same result.
pub fn resolve_environment(
    resource: &Resource,
    execution: ExecutionContext,
) -> Result<BTreeMap<String, String>> {
    let mut env = BTreeMap::new();
    for callback in resource.environment_callbacks() {
        let mut context = EnvCallbackContext {
            execution,
            env: &mut env,
        };
        callback.invoke(&mut context)?;
    }
    debug!(
        resource = %resource.name(),
        mode = %execution.operation(),
        vars = env.len(),
        "environment resolved"
    );
    Ok(env)
}
