//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `planweave_core::api` instead of reaching into internal modules.

pub use crate::compiler::{Compiler, CompilerBuilder, CompilerOutput, Planner, DEFAULT_MAX_REPLANS};
pub use crate::config::{
    load_default, load_from_path, AppConfig, CommandOperationConfig, HttpOperationConfig,
    LoggingConfig, OperationConfig, OperationKind, OracleConfig,
};
pub use crate::error::{
    CompilerError, ErrorCode, ExecutorError, OracleError, PlanError, RegistryError,
};
pub use crate::executor::{
    ExecutionResult, FailurePolicy, SchedulerOptions, TaskFetchingUnit, TaskGraph, TaskRecord,
};
pub use crate::operation::{default_stringify, FnOperation, Operation, OperationRegistry};
pub use crate::oracle::{CompletionRequest, Oracle, TokenStream};
pub use crate::plan::{Plan, PlanParser, StreamingPlanParser, Task, TaskStatus, END_OF_PLAN};
