//! Execution context - the immutable Run/Publish flag for an orchestration session

use serde::{Deserialize, Serialize};

/// What the session is doing: live orchestration or manifest generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Run,
    Publish,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Publish => write!(f, "publish"),
        }
    }
}

/// Session-wide execution context. Created once, consulted everywhere,
/// never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionContext {
    operation: Operation,
}

impl ExecutionContext {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    pub fn run() -> Self {
        Self::new(Operation::Run)
    }

    pub fn publish() -> Self {
        Self::new(Operation::Publish)
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn is_run(&self) -> bool {
        self.operation == Operation::Run
    }

    pub fn is_publish(&self) -> bool {
        self.operation == Operation::Publish
    }
}
