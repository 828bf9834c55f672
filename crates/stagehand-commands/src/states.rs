//! Known resource states - classification of snapshot state text

pub const STARTING: &str = "Starting";
pub const RUNNING: &str = "Running";
pub const STOPPING: &str = "Stopping";
pub const EXITED: &str = "Exited";
pub const FINISHED: &str = "Finished";
pub const FAILED_TO_START: &str = "FailedToStart";

/// Terminal labels that all count as stopped.
pub const STOPPED_STATES: [&str; 3] = [EXITED, FINISHED, FAILED_TO_START];

pub fn is_starting(state: Option<&str>) -> bool {
    state == Some(STARTING)
}

pub fn is_stopping(state: Option<&str>) -> bool {
    state == Some(STOPPING)
}

pub fn is_stopped(state: Option<&str>) -> bool {
    matches!(state, Some(s) if STOPPED_STATES.contains(&s))
}
