use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operation::{default_stringify, Operation};

/// Ordered `idx -> Task` mapping produced by one parse pass.
pub type Plan = BTreeMap<u32, Task>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    /// Every dependency has resolved; awaiting dispatch.
    Ready,
    Running,
    Done,
    Failed,
}

impl TaskStatus {
    /// Done or failed: dependents may proceed.
    pub fn is_resolved(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

/// One operation invocation in a plan, or the join sentinel.
#[derive(Clone)]
pub struct Task {
    pub idx: u32,
    pub name: String,
    /// Argument text exactly as written between the parentheses.
    pub raw_args: String,
    pub args: Vec<Value>,
    pub dependencies: BTreeSet<u32>,
    pub thought: Option<String>,
    pub is_join: bool,
    /// Resolved at parse time; `None` only for join.
    pub operation: Option<Arc<dyn Operation>>,
    pub result: Option<Value>,
    pub observation: Option<String>,
    pub status: TaskStatus,
}

impl Task {
    /// Render a result with the operation's stringify rule.
    pub fn stringify_result(&self, result: &Value) -> String {
        match &self.operation {
            Some(op) => op.stringify(result),
            None => default_stringify(result),
        }
    }

    /// Text dependents substitute for `$idx`: the observation once resolved.
    pub fn substitution_text(&self) -> Option<&str> {
        if self.status.is_resolved() {
            self.observation.as_deref()
        } else {
            None
        }
    }
}

/// `name(arg1, arg2)` with every argument in literal form.
pub fn render_action(name: &str, args: &[Value]) -> String {
    let rendered: Vec<String> = args.iter().map(Value::to_string).collect();
    format!("{}({})", name, rendered.join(", "))
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("idx", &self.idx)
            .field("name", &self.name)
            .field("args", &self.args)
            .field("dependencies", &self.dependencies)
            .field("thought", &self.thought)
            .field("is_join", &self.is_join)
            .field("status", &self.status)
            .field("observation", &self.observation)
            .finish()
    }
}

// The operation handle is identified by name; everything else is data.
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
            && self.name == other.name
            && self.raw_args == other.raw_args
            && self.args == other.args
            && self.dependencies == other.dependencies
            && self.thought == other.thought
            && self.is_join == other.is_join
            && self.result == other.result
            && self.observation == other.observation
            && self.status == other.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_action_uses_literal_forms() {
        assert_eq!(render_action("search", &[json!("x")]), r#"search("x")"#);
        assert_eq!(render_action("math", &[json!(1), json!([2, 3])]), "math(1, [2,3])");
        assert_eq!(render_action("join", &[]), "join()");
    }

    #[test]
    fn resolved_statuses() {
        assert!(TaskStatus::Done.is_resolved());
        assert!(TaskStatus::Failed.is_resolved());
        assert!(!TaskStatus::Running.is_resolved());
        assert!(!TaskStatus::Pending.is_resolved());
    }
}
