//! Task fetching scheduler for plan graphs.
//!
//! ```text
//! Plan (BTreeMap<idx, Task>)            Stream<Result<Task, PlanError>>
//!   ↓ set_tasks()                         ↓ schedule_stream()
//! TaskGraph { edges, reverse_edges }  ← add_task() per arrival
//!   ↓
//! TaskFetchingUnit: dispatch on last dependency resolved (FuturesUnordered)
//!   ↓
//! ExecutionResult { records ordered by idx, stages }
//! ```

mod graph;
mod progress;
mod scheduler;
pub mod trace;
mod types;

pub use graph::TaskGraph;
pub use progress::ProgressMonitor;
pub use scheduler::TaskFetchingUnit;
pub use trace::{render_record, render_trace, TraceStyle};
pub use types::{ExecutionResult, FailurePolicy, SchedulerOptions, TaskRecord};
