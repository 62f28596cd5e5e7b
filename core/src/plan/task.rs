use crate::error::PlanError;
use crate::operation::{OperationRegistry, JOIN_OPERATION};

use super::args::parse_action_args;
use super::deps::resolve_dependencies;
use super::types::{Task, TaskStatus};

/// Build a pending task from one parsed action line.
///
/// The operation is resolved here so a plan naming an unknown operation
/// fails at parse time rather than mid-execution.
pub fn instantiate_task(
    registry: &OperationRegistry,
    idx: u32,
    name: &str,
    raw_args: &str,
    thought: Option<String>,
) -> Result<Task, PlanError> {
    let is_join = name == JOIN_OPERATION;
    let operation = if is_join {
        None
    } else {
        let op = registry
            .get(name)
            .ok_or_else(|| PlanError::OperationNotFound(name.to_string()))?;
        Some(op.clone())
    };

    Ok(Task {
        idx,
        name: name.to_string(),
        raw_args: raw_args.to_string(),
        args: if is_join { Vec::new() } else { parse_action_args(raw_args) },
        dependencies: resolve_dependencies(idx, name, raw_args),
        thought,
        is_join,
        operation,
        result: None,
        observation: None,
        status: TaskStatus::Pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::FnOperation;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn registry() -> OperationRegistry {
        OperationRegistry::new(vec![Arc::new(FnOperation::new(
            "search",
            "search(query)",
            |_| async { Ok(Value::Null) },
        ))])
        .unwrap()
    }

    #[test]
    fn resolves_operation_and_args() {
        let task = instantiate_task(&registry(), 2, "search", r#""about $1""#, Some("t".into())).unwrap();
        assert_eq!(task.args, vec![json!("about $1")]);
        assert_eq!(task.dependencies, BTreeSet::from([1]));
        assert_eq!(task.thought.as_deref(), Some("t"));
        assert!(task.operation.is_some());
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn join_has_no_operation() {
        let task = instantiate_task(&registry(), 3, "join", "", None).unwrap();
        assert!(task.is_join);
        assert!(task.operation.is_none());
        assert_eq!(task.dependencies, BTreeSet::from([1, 2]));
    }

    #[test]
    fn unknown_operation_is_fatal() {
        let err = instantiate_task(&registry(), 1, "browse", "'x'", None).unwrap_err();
        assert!(matches!(err, PlanError::OperationNotFound(name) if name == "browse"));
    }
}
