use thiserror::Error;

use super::plan::PlanError;

/// Scheduler errors for task graph installation and execution
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Duplicate task index: {0}")]
    DuplicateTaskIdx(u32),

    #[error("Dependency not found: task {task_idx} depends on {missing_dep}")]
    DependencyNotFound { task_idx: u32, missing_dep: u32 },

    #[error("Invalid dependency: task {task_idx} cannot depend on {dep} (not an earlier task)")]
    InvalidDependency { task_idx: u32, dep: u32 },

    #[error("Task {idx} ({name}) failed: {message}")]
    TaskFailed {
        idx: u32,
        name: String,
        message: String,
    },

    #[error("Schedule timeout after {0} ms")]
    ScheduleTimeout(u64),

    #[error("Scheduler stalled with unresolved tasks: {0:?}")]
    Stalled(Vec<u32>),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),
}
