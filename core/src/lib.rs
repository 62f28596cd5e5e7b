//! Plan-graph compiler and concurrent task-fetching scheduler.
//!
//! An oracle writes a plan as numbered operation calls; this crate parses the
//! plan (whole or token by token) into a task graph, runs the graph with every
//! legal task in flight at once, and drives the plan/execute/synthesize/replan
//! loop until the joiner answers or the replan budget runs out.
//!
//! ```text
//! oracle text
//!   ↓
//! PlanParser / StreamingPlanParser → Plan (BTreeMap<idx, Task>)
//!   ↓
//! TaskFetchingUnit::schedule() → ExecutionResult (ordered TaskRecords)
//!   ↓
//! Joiner::join() → Finish(answer) | Replan
//!   ↓
//! Compiler::run() → CompilerOutput
//! ```

pub mod api;
pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod operation;
pub mod oracle;
pub mod plan;

pub use compiler::{Compiler, CompilerBuilder, CompilerOutput};
pub use error::{CompilerError, ExecutorError, OracleError, PlanError, RegistryError};
pub use operation::{FnOperation, Operation, OperationRegistry};
pub use oracle::{CompletionRequest, Oracle, TokenStream};
pub use plan::{Plan, PlanParser, StreamingPlanParser, Task, TaskStatus};
