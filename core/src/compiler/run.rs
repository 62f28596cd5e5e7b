use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Span;
use uuid::Uuid;

use crate::error::{CompilerError, ExecutorError};
use crate::executor::{ExecutionResult, SchedulerOptions, TaskFetchingUnit};
use crate::operation::OperationRegistry;
use crate::oracle::Oracle;
use crate::plan::END_OF_PLAN;

use super::context::{format_contexts, replan_context, Scratchpad};
use super::joiner::Joiner;
use super::phase::{LoopPhase, PhaseTracker};
use super::planner::{Planner, PlannerConfig};
use super::prompt::{DEFAULT_JOINER_PROMPT, DEFAULT_PLANNER_EXAMPLES};

pub const DEFAULT_MAX_REPLANS: usize = 2;
const DEFAULT_MODEL: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOutput {
    /// Joiner answer from the iteration that stopped the loop.
    pub output: Option<String>,
    pub iterations: usize,
    pub run_id: String,
}

/// Plan, execute, synthesize and replan until the joiner answers.
pub struct Compiler {
    registry: Arc<OperationRegistry>,
    planner: Planner,
    joiner: Joiner,
    max_replans: usize,
    streaming: bool,
    scheduler: SchedulerOptions,
    schedule_timeout: Option<Duration>,
    span: Span,
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::default()
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn max_replans(&self) -> usize {
        self.max_replans
    }

    pub async fn run(&self, input: &str) -> Result<CompilerOutput, CompilerError> {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(parent: &self.span, "compiler_run", run_id = %run_id);

        let mut phase = PhaseTracker::new();
        let mut contexts: Vec<String> = Vec::new();
        let mut formatted_contexts: Option<String> = None;
        let mut scratchpad = Scratchpad::new();
        let mut answer = None;
        let mut iterations = 0;

        for i in 0..self.max_replans {
            let is_final = i + 1 == self.max_replans;
            iterations = i + 1;
            if i > 0 {
                phase.advance(LoopPhase::Plan)?;
            }
            tracing::info!(parent: &span, iteration = i, is_final, streaming = self.streaming, "planning");

            let result = self
                .plan_and_execute(input, formatted_contexts.as_deref(), &mut phase, &span)
                .await?;
            scratchpad.append(&result);

            phase.advance(LoopPhase::Synthesize)?;
            let joined = self.joiner.join(input, scratchpad.as_str(), is_final).await?;
            answer = joined.answer.clone();

            if !joined.is_replan {
                phase.advance(LoopPhase::Finish)?;
                if answer.is_none() {
                    tracing::warn!(
                        parent: &span,
                        iteration = i,
                        "joiner gave neither a Finish answer nor a replan request; stopping"
                    );
                }
                break;
            }

            phase.advance(LoopPhase::Replan)?;
            tracing::info!(parent: &span, iteration = i, thought = ?joined.thought, "replanning");
            contexts.push(replan_context(&result, joined.thought.as_deref()));
            formatted_contexts = Some(format_contexts(&contexts));
        }

        tracing::info!(parent: &span, iterations, answered = answer.is_some(), "compiler run finished");
        Ok(CompilerOutput {
            output: answer,
            iterations,
            run_id,
        })
    }

    async fn plan_and_execute(
        &self,
        input: &str,
        context: Option<&str>,
        phase: &mut PhaseTracker,
        span: &Span,
    ) -> Result<ExecutionResult, CompilerError> {
        let mut tfu = TaskFetchingUnit::new(self.scheduler.clone(), span.clone());

        if self.streaming {
            phase.advance(LoopPhase::Execute)?;
            let tasks = self.planner.plan_stream(input, context);
            return Ok(self.bounded(tfu.schedule_stream(tasks)).await?);
        }

        let plan = self.planner.plan(input, context).await?;
        tracing::debug!(parent: span, tasks = plan.len(), "plan parsed");
        phase.advance(LoopPhase::Execute)?;
        tfu.set_tasks(plan)?;
        Ok(self.bounded(tfu.schedule()).await?)
    }

    async fn bounded<F>(&self, schedule: F) -> Result<ExecutionResult, ExecutorError>
    where
        F: Future<Output = Result<ExecutionResult, ExecutorError>>,
    {
        match self.schedule_timeout {
            Some(limit) => tokio::time::timeout(limit, schedule)
                .await
                .map_err(|_| ExecutorError::ScheduleTimeout(limit.as_millis() as u64))?,
            None => schedule.await,
        }
    }
}

/// Builder for [`Compiler`]. Only an oracle is required.
pub struct CompilerBuilder {
    registry: Arc<OperationRegistry>,
    planner_oracle: Option<Arc<dyn Oracle>>,
    joiner_oracle: Option<Arc<dyn Oracle>>,
    planner_model: String,
    joiner_model: String,
    example_prompt: String,
    example_prompt_replan: Option<String>,
    stop: Vec<String>,
    joiner_prompt: String,
    joiner_prompt_final: Option<String>,
    max_replans: usize,
    streaming: bool,
    scheduler: SchedulerOptions,
    schedule_timeout: Option<Duration>,
    span: Option<Span>,
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self {
            registry: Arc::new(OperationRegistry::default()),
            planner_oracle: None,
            joiner_oracle: None,
            planner_model: DEFAULT_MODEL.to_string(),
            joiner_model: DEFAULT_MODEL.to_string(),
            example_prompt: DEFAULT_PLANNER_EXAMPLES.to_string(),
            example_prompt_replan: None,
            stop: vec![END_OF_PLAN.to_string()],
            joiner_prompt: DEFAULT_JOINER_PROMPT.to_string(),
            joiner_prompt_final: None,
            max_replans: DEFAULT_MAX_REPLANS,
            streaming: false,
            scheduler: SchedulerOptions::default(),
            schedule_timeout: None,
            span: None,
        }
    }
}

impl CompilerBuilder {
    pub fn registry(mut self, registry: impl Into<Arc<OperationRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Use one oracle for both planning and synthesis.
    pub fn oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.planner_oracle = Some(oracle.clone());
        self.joiner_oracle = Some(oracle);
        self
    }

    pub fn planner_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.planner_oracle = Some(oracle);
        self
    }

    pub fn joiner_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.joiner_oracle = Some(oracle);
        self
    }

    pub fn planner_model(mut self, model: impl Into<String>) -> Self {
        self.planner_model = model.into();
        self
    }

    pub fn joiner_model(mut self, model: impl Into<String>) -> Self {
        self.joiner_model = model.into();
        self
    }

    pub fn example_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.example_prompt = prompt.into();
        self
    }

    pub fn example_prompt_replan(mut self, prompt: Option<String>) -> Self {
        self.example_prompt_replan = prompt;
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn joiner_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.joiner_prompt = prompt.into();
        self
    }

    pub fn joiner_prompt_final(mut self, prompt: Option<String>) -> Self {
        self.joiner_prompt_final = prompt;
        self
    }

    pub fn max_replans(mut self, max_replans: usize) -> Self {
        self.max_replans = max_replans;
        self
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn scheduler(mut self, scheduler: SchedulerOptions) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn schedule_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.schedule_timeout = timeout;
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Result<Compiler, CompilerError> {
        if self.max_replans == 0 {
            return Err(CompilerError::Config("max_replans must be at least 1".into()));
        }
        let planner_oracle = self
            .planner_oracle
            .ok_or_else(|| CompilerError::Config("planner oracle is not configured".into()))?;
        let joiner_oracle = self
            .joiner_oracle
            .ok_or_else(|| CompilerError::Config("joiner oracle is not configured".into()))?;

        let span = self
            .span
            .unwrap_or_else(|| tracing::info_span!("compiler"));
        let planner = Planner::new(
            self.registry.clone(),
            planner_oracle,
            PlannerConfig {
                model: self.planner_model,
                example_prompt: self.example_prompt,
                example_prompt_replan: self.example_prompt_replan,
                stop: self.stop,
            },
            tracing::debug_span!(parent: &span, "planner"),
        );
        let joiner = Joiner::new(
            joiner_oracle,
            self.joiner_model,
            self.joiner_prompt,
            self.joiner_prompt_final,
            tracing::debug_span!(parent: &span, "joiner"),
        );

        Ok(Compiler {
            registry: self.registry,
            planner,
            joiner,
            max_replans: self.max_replans,
            streaming: self.streaming,
            scheduler: self.scheduler,
            schedule_timeout: self.schedule_timeout,
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_an_oracle() {
        let err = Compiler::builder().build().err().unwrap();
        assert!(matches!(err, CompilerError::Config(_)));
    }

    #[test]
    fn build_rejects_zero_replans() {
        struct Never;

        #[async_trait::async_trait]
        impl Oracle for Never {
            fn name(&self) -> &str {
                "never"
            }

            async fn complete(
                &self,
                _request: &crate::oracle::CompletionRequest,
            ) -> Result<String, crate::error::OracleError> {
                Ok(String::new())
            }
        }

        let err = Compiler::builder()
            .oracle(Arc::new(Never))
            .max_replans(0)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, CompilerError::Config(_)));
    }
}
