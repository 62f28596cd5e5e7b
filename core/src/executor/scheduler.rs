use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use serde_json::Value;
use tracing::Span;

use crate::error::{ExecutorError, PlanError};
use crate::operation::Operation;
use crate::plan::{render_action, substitute_value, Plan, Task, TaskStatus};

use super::graph::TaskGraph;
use super::progress::ProgressMonitor;
use super::types::{ExecutionResult, FailurePolicy, SchedulerOptions, TaskRecord};

struct Invocation {
    idx: u32,
    result: Result<Value, String>,
    duration_ms: u64,
}

type InFlight = FuturesUnordered<BoxFuture<'static, Invocation>>;

/// Runs one task graph with every eligible task in flight at once.
///
/// A task is dispatched the moment its last dependency resolves; there is no
/// stage barrier and no concurrency cap. Join is never dispatched and simply
/// resolves when everything before it has.
pub struct TaskFetchingUnit {
    opts: SchedulerOptions,
    span: Span,
    tasks: Plan,
    graph: TaskGraph,
    records: BTreeMap<u32, TaskRecord>,
    progress: ProgressMonitor,
}

impl TaskFetchingUnit {
    pub fn new(opts: SchedulerOptions, span: Span) -> Self {
        Self {
            opts,
            span,
            tasks: Plan::new(),
            graph: TaskGraph::default(),
            records: BTreeMap::new(),
            progress: ProgressMonitor::hidden(),
        }
    }

    /// Install and validate a complete plan, replacing any previous one.
    pub fn set_tasks(&mut self, plan: Plan) -> Result<(), ExecutorError> {
        self.graph = TaskGraph::from_plan(&plan)?;
        self.tasks = plan;
        self.records.clear();
        let all: Vec<u32> = self.tasks.keys().copied().collect();
        for idx in all {
            self.mark_ready(idx);
        }
        Ok(())
    }

    /// Add one task to the installed graph.
    pub fn add_task(&mut self, task: Task) -> Result<(), ExecutorError> {
        let idx = task.idx;
        self.graph.insert(idx, &task.dependencies)?;
        self.tasks.insert(idx, task);
        self.mark_ready(idx);
        Ok(())
    }

    pub fn tasks(&self) -> &Plan {
        &self.tasks
    }

    pub fn into_tasks(self) -> Plan {
        self.tasks
    }

    /// Run the installed graph until every task is done or failed.
    pub async fn schedule(&mut self) -> Result<ExecutionResult, ExecutorError> {
        let started = Instant::now();
        let mut in_flight = InFlight::new();
        self.progress = ProgressMonitor::new(self.tasks.len(), self.opts.progress);

        tracing::debug!(
            target: "planweave.executor",
            parent: &self.span,
            tasks = self.tasks.len(),
            "schedule start"
        );

        let all: Vec<u32> = self.tasks.keys().copied().collect();
        for idx in all {
            self.try_dispatch(idx, &mut in_flight);
        }

        while let Some(invocation) = in_flight.next().await {
            self.complete(invocation, &mut in_flight)?;
        }

        self.finish(started)
    }

    /// Run tasks while the parser is still producing them.
    ///
    /// Each arriving task is added to the graph and dispatched at once if its
    /// dependencies have already resolved.
    pub async fn schedule_stream<S>(&mut self, incoming: S) -> Result<ExecutionResult, ExecutorError>
    where
        S: Stream<Item = Result<Task, PlanError>>,
    {
        let started = Instant::now();
        let mut in_flight = InFlight::new();
        let mut incoming = std::pin::pin!(incoming);
        let mut incoming_done = false;
        self.progress = ProgressMonitor::new(self.tasks.len(), self.opts.progress);

        tracing::debug!(target: "planweave.executor", parent: &self.span, "streaming schedule start");

        let all: Vec<u32> = self.tasks.keys().copied().collect();
        for idx in all {
            self.try_dispatch(idx, &mut in_flight);
        }

        loop {
            tokio::select! {
                next = incoming.next(), if !incoming_done => match next {
                    Some(Ok(task)) => {
                        let idx = task.idx;
                        self.add_task(task)?;
                        self.progress.add_total(1);
                        self.try_dispatch(idx, &mut in_flight);
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => incoming_done = true,
                },
                Some(invocation) = in_flight.next(), if !in_flight.is_empty() => {
                    self.complete(invocation, &mut in_flight)?;
                }
                else => break,
            }
        }

        self.finish(started)
    }

    fn dependencies_resolved(&self, task: &Task) -> bool {
        task.dependencies.iter().all(|dep| {
            self.tasks
                .get(dep)
                .is_some_and(|t| t.status.is_resolved())
        })
    }

    /// Promote a pending task to ready once all of its dependencies resolved.
    fn mark_ready(&mut self, idx: u32) -> bool {
        let eligible = match self.tasks.get(&idx) {
            Some(task) if task.status == TaskStatus::Pending => self.dependencies_resolved(task),
            Some(task) => task.status == TaskStatus::Ready,
            None => false,
        };
        if let Some(task) = self.tasks.get_mut(&idx).filter(|_| eligible) {
            task.status = TaskStatus::Ready;
        }
        eligible
    }

    fn try_dispatch(&mut self, idx: u32, in_flight: &mut InFlight) {
        if !self.mark_ready(idx) {
            return;
        }
        let Some(task) = self.tasks.get(&idx) else {
            return;
        };

        if task.is_join {
            self.resolve_join(idx, in_flight);
            return;
        }

        // Only declared dependencies are substituted; forward references stay literal.
        let lookup = |n: u32| {
            if !task.dependencies.contains(&n) {
                return None;
            }
            self.tasks
                .get(&n)
                .and_then(Task::substitution_text)
                .map(str::to_string)
        };
        let args: Vec<Value> = task.args.iter().map(|arg| substitute_value(arg, &lookup)).collect();
        let action = render_action(&task.name, &args);
        let operation = task.operation.clone();
        let thought = task.thought.clone();

        tracing::debug!(
            target: "planweave.executor",
            parent: &self.span,
            idx,
            action = %action,
            "dispatch"
        );
        self.progress.start_task(idx, &action);
        self.records.insert(
            idx,
            TaskRecord {
                idx,
                thought,
                action,
                observation: None,
                status: TaskStatus::Running,
                is_join: false,
                duration_ms: 0,
            },
        );
        if let Some(task) = self.tasks.get_mut(&idx) {
            task.args = args.clone();
            task.status = TaskStatus::Running;
        }

        let timeout = self.opts.operation_timeout;
        in_flight.push(
            async move {
                let started = Instant::now();
                let result = match operation {
                    Some(op) => invoke(op, args, timeout).await,
                    None => Err("no operation bound to task".to_string()),
                };
                Invocation {
                    idx,
                    result,
                    duration_ms: started.elapsed().as_millis() as u64,
                }
            }
            .boxed(),
        );
    }

    fn resolve_join(&mut self, idx: u32, in_flight: &mut InFlight) {
        let Some(task) = self.tasks.get_mut(&idx) else {
            return;
        };
        task.status = TaskStatus::Done;
        self.records.insert(
            idx,
            TaskRecord {
                idx,
                thought: task.thought.clone(),
                action: render_action(&task.name, &[]),
                observation: None,
                status: TaskStatus::Done,
                is_join: true,
                duration_ms: 0,
            },
        );
        self.progress.complete_task(idx, true, 0);
        tracing::debug!(target: "planweave.executor", parent: &self.span, idx, "join resolved");

        self.dispatch_dependents(idx, in_flight);
    }

    fn complete(&mut self, invocation: Invocation, in_flight: &mut InFlight) -> Result<(), ExecutorError> {
        let Invocation {
            idx,
            result,
            duration_ms,
        } = invocation;
        let span = &self.span;
        let Some(task) = self.tasks.get_mut(&idx) else {
            return Ok(());
        };

        let (status, observation) = match result {
            Ok(value) => {
                let observation = task.stringify_result(&value);
                task.result = Some(value);
                (TaskStatus::Done, observation)
            }
            Err(message) => {
                tracing::warn!(
                    target: "planweave.executor",
                    parent: span,
                    idx,
                    name = %task.name,
                    error = %message,
                    "task failed"
                );
                (TaskStatus::Failed, message)
            }
        };
        task.status = status;
        task.observation = Some(observation.clone());
        let name = task.name.clone();

        if let Some(record) = self.records.get_mut(&idx) {
            record.status = status;
            record.observation = Some(observation.clone());
            record.duration_ms = duration_ms;
        }
        self.progress
            .complete_task(idx, status == TaskStatus::Done, duration_ms);
        tracing::debug!(
            target: "planweave.executor",
            parent: &self.span,
            idx,
            status = ?status,
            duration_ms,
            "task resolved"
        );

        if status == TaskStatus::Failed && self.opts.failure_policy == FailurePolicy::Abort {
            self.progress.finish(false);
            return Err(ExecutorError::TaskFailed {
                idx,
                name,
                message: observation,
            });
        }

        self.dispatch_dependents(idx, in_flight);
        Ok(())
    }

    fn dispatch_dependents(&mut self, idx: u32, in_flight: &mut InFlight) {
        let dependents = self.graph.dependents(idx).to_vec();
        for dependent in dependents {
            self.try_dispatch(dependent, in_flight);
        }
    }

    fn finish(&mut self, started: Instant) -> Result<ExecutionResult, ExecutorError> {
        let unresolved: Vec<u32> = self
            .tasks
            .values()
            .filter(|t| !t.status.is_resolved())
            .map(|t| t.idx)
            .collect();
        if !unresolved.is_empty() {
            self.progress.finish(false);
            return Err(ExecutorError::Stalled(unresolved));
        }

        let failed = self
            .tasks
            .values()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();
        let result = ExecutionResult {
            total_tasks: self.tasks.len(),
            completed: self.tasks.len() - failed,
            failed,
            duration_ms: started.elapsed().as_millis() as u64,
            records: self.records.clone(),
            stages: self.graph.topological_sort(),
        };
        self.progress.finish(failed == 0);

        tracing::info!(
            target: "planweave.executor",
            parent: &self.span,
            total = result.total_tasks,
            failed = result.failed,
            duration_ms = result.duration_ms,
            "schedule complete"
        );
        Ok(result)
    }
}

async fn invoke(
    op: Arc<dyn Operation>,
    args: Vec<Value>,
    timeout: Option<Duration>,
) -> Result<Value, String> {
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, op.invoke(args)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                return Err(format!(
                    "operation '{}' timed out after {} ms",
                    op.name(),
                    limit.as_millis()
                ))
            }
        },
        None => op.invoke(args).await,
    };
    outcome.map_err(|err| format!("{err:#}"))
}
