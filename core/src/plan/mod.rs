//! Plan text → task graph.
//!
//! Both parsers feed complete lines through one [`LineMatcher`], which is what
//! keeps streaming output identical to batch output for any token split.

pub mod args;
pub mod deps;
pub mod lexer;
mod matcher;
mod parser;
mod streaming;
mod task;
mod types;

pub use args::parse_action_args;
pub use deps::{resolve_dependencies, substitute_placeholders, substitute_value};
pub use lexer::{classify_line, ActionLine, Line};
pub use matcher::LineMatcher;
pub use parser::PlanParser;
pub use streaming::StreamingPlanParser;
pub use task::instantiate_task;
pub use types::{render_action, Plan, Task, TaskStatus};

/// Marker the planner emits after the join action.
pub const END_OF_PLAN: &str = "<END_OF_PLAN>";
