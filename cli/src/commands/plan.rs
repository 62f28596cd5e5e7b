use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use planweave_core::api::{
    AppConfig, FnOperation, OperationRegistry, Plan, PlanParser, TaskGraph,
};

use super::{read_input, registry_from_config};
use crate::cli::PlanArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub tasks: Vec<TaskView>,
    pub stages: Vec<Vec<u32>>,
}

#[derive(Debug, Serialize)]
pub struct TaskView {
    pub idx: u32,
    pub name: String,
    pub raw_args: String,
    pub args: Vec<Value>,
    pub dependencies: BTreeSet<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

pub fn plan_cmd(args: PlanArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let text = read_input(&args.file)?;
    let mut registry = registry_from_config(cfg)?;
    declare_ops(&mut registry, &args.ops)?;

    let report = analyze(Arc::new(registry), &text)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
        println!("{json}");
    } else {
        print!("{}", render_report(&report));
    }
    Ok(0)
}

/// Parse-only stand-ins for operations the config doesn't define.
fn declare_ops(registry: &mut OperationRegistry, names: &[String]) -> Result<(), CliError> {
    for name in names {
        if registry.get(name).is_some() {
            continue;
        }
        let op = FnOperation::new(name.as_str(), format!("{name}(...)"), |_| async {
            Err::<Value, _>(anyhow::anyhow!("declared for parsing only"))
        });
        registry
            .register(Arc::new(op))
            .map_err(|e| CliError::Config(e.to_string()))?;
    }
    Ok(())
}

pub fn analyze(registry: Arc<OperationRegistry>, text: &str) -> Result<PlanReport, CliError> {
    let plan: Plan = PlanParser::new(registry).parse(text)?;
    let stages = TaskGraph::from_plan(&plan)?.topological_sort();

    let tasks = plan
        .into_values()
        .map(|task| TaskView {
            idx: task.idx,
            name: task.name,
            raw_args: task.raw_args,
            args: task.args,
            dependencies: task.dependencies,
            thought: task.thought,
        })
        .collect();
    Ok(PlanReport { tasks, stages })
}

pub fn render_report(report: &PlanReport) -> String {
    let mut out = String::new();
    for task in &report.tasks {
        if let Some(thought) = &task.thought {
            let _ = writeln!(out, "Thought: {thought}");
        }
        let _ = writeln!(out, "{}. {}({})", task.idx, task.name, task.raw_args);
        if !task.dependencies.is_empty() {
            let deps: Vec<String> = task.dependencies.iter().map(u32::to_string).collect();
            let _ = writeln!(out, "   after: {}", deps.join(", "));
        }
    }

    let _ = writeln!(out, "\nStages:");
    for (i, stage) in report.stages.iter().enumerate() {
        let ids: Vec<String> = stage.iter().map(u32::to_string).collect();
        let _ = writeln!(out, "  {}: {}", i + 1, ids.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry(names: &[&str]) -> OperationRegistry {
        let mut registry = OperationRegistry::default();
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        declare_ops(&mut registry, &names).unwrap();
        registry
    }

    #[test]
    fn report_lists_tasks_and_stages() {
        let text = "Thought: both at once\n1. search(\"a\")\n2. search(\"b\")\n3. math(\"$1 + $2\")\n4. join()\n";
        let report = analyze(Arc::new(registry(&["search", "math"])), text).unwrap();

        assert_eq!(report.stages, vec![vec![1, 2], vec![3], vec![4]]);
        assert_eq!(
            render_report(&report),
            "Thought: both at once\n\
             1. search(\"a\")\n\
             2. search(\"b\")\n\
             3. math(\"$1 + $2\")\n   after: 1, 2\n\
             4. join()\n   after: 1, 2, 3\n\
             \nStages:\n  1: 1, 2\n  2: 3\n  3: 4\n"
        );
    }

    #[test]
    fn undeclared_operation_is_a_plan_error() {
        let err = analyze(Arc::new(registry(&[])), "1. search(\"a\")\n").unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn declaring_twice_is_harmless() {
        let mut reg = registry(&["search"]);
        declare_ops(&mut reg, &["search".to_string()]).unwrap();
        assert_eq!(reg.len(), 1);
    }
}
