use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::plan::TaskStatus;

/// What the scheduler does when an operation invocation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The error text becomes the task's observation and dependents proceed.
    #[default]
    RecordAndContinue,
    /// The first failure ends the schedule with `ExecutorError::TaskFailed`.
    Abort,
}

/// Options for one [`super::TaskFetchingUnit`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerOptions {
    pub failure_policy: FailurePolicy,

    /// Per-invocation limit; expiry fails the task.
    pub operation_timeout: Option<Duration>,

    /// Show an indicatif progress display on stderr.
    pub progress: bool,
}

/// Trace entry for one task, written when the task resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub idx: u32,
    pub thought: Option<String>,
    /// `name(args)` with placeholders already substituted.
    pub action: String,
    pub observation: Option<String>,
    pub status: TaskStatus,
    pub is_join: bool,
    pub duration_ms: u64,
}

/// Result of running one task graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub total_tasks: usize,

    /// Tasks that reached `Done` (join included).
    pub completed: usize,

    pub failed: usize,

    pub duration_ms: u64,

    /// Records keyed, and therefore ordered, by planned index.
    pub records: BTreeMap<u32, TaskRecord>,

    /// Dependency levels of the installed graph (for display).
    pub stages: Vec<Vec<u32>>,
}

impl ExecutionResult {
    /// Records of the non-join tasks in planned order.
    pub fn action_records(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records.values().filter(|r| !r.is_join)
    }
}
