use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::Span;

use crate::error::PlanError;
use crate::operation::OperationRegistry;
use crate::oracle::{CompletionRequest, Oracle};
use crate::plan::{Plan, PlanParser, StreamingPlanParser, Task};

use super::prompt::{planner_message, planner_prompt};

/// Planner settings that do not depend on the registry.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub model: String,
    pub example_prompt: String,
    /// Falls back to `example_prompt` when unset.
    pub example_prompt_replan: Option<String>,
    pub stop: Vec<String>,
}

/// Asks the oracle for a plan and parses it.
pub struct Planner {
    registry: Arc<OperationRegistry>,
    oracle: Arc<dyn Oracle>,
    model: String,
    stop: Vec<String>,
    system_prompt: String,
    system_prompt_replan: String,
    span: Span,
}

impl Planner {
    pub fn new(
        registry: Arc<OperationRegistry>,
        oracle: Arc<dyn Oracle>,
        config: PlannerConfig,
        span: Span,
    ) -> Self {
        let replan_examples = config
            .example_prompt_replan
            .as_deref()
            .unwrap_or(&config.example_prompt);
        Self {
            system_prompt: planner_prompt(&registry, &config.example_prompt, false),
            system_prompt_replan: planner_prompt(&registry, replan_examples, true),
            registry,
            oracle,
            model: config.model,
            stop: config.stop,
            span,
        }
    }

    pub fn system_prompt(&self, is_replan: bool) -> &str {
        if is_replan {
            &self.system_prompt_replan
        } else {
            &self.system_prompt
        }
    }

    /// The request for `input`; a `context` marks a replan.
    pub fn request(&self, input: &str, context: Option<&str>) -> CompletionRequest {
        let message = planner_message(self.system_prompt(context.is_some()), input, context);
        CompletionRequest::new(self.model.clone(), message).with_stop(self.stop.clone())
    }

    /// Batch mode: full completion, then one parse.
    pub async fn plan(&self, input: &str, context: Option<&str>) -> Result<Plan, PlanError> {
        let request = self.request(input, context);
        tracing::debug!(
            target: "planweave.planner",
            parent: &self.span,
            oracle = self.oracle.name(),
            replan = context.is_some(),
            prompt_chars = request.prompt.len(),
            "planner request"
        );

        let mut text = self.oracle.complete(&request).await?;
        text.push('\n');
        tracing::debug!(target: "planweave.planner", parent: &self.span, plan = %text, "planner response");

        PlanParser::new(self.registry.clone()).parse(&text)
    }

    /// Streaming mode: tasks are yielded as soon as their line completes.
    pub fn plan_stream<'a>(
        &'a self,
        input: &'a str,
        context: Option<&'a str>,
    ) -> impl Stream<Item = Result<Task, PlanError>> + 'a {
        let request = self.request(input, context);
        async_stream::try_stream! {
            tracing::debug!(
                target: "planweave.planner",
                parent: &self.span,
                oracle = self.oracle.name(),
                replan = context.is_some(),
                "planner stream request"
            );
            let mut tokens = self
                .oracle
                .complete_stream(&request)
                .await
                .map_err(PlanError::from)?;
            let mut parser = StreamingPlanParser::new(self.registry.clone());

            while let Some(token) = tokens.next().await {
                let token = token.map_err(PlanError::from)?;
                for task in parser.ingest_token(&token)? {
                    tracing::debug!(target: "planweave.planner", parent: &self.span, idx = task.idx, "streamed task");
                    yield task;
                }
                if parser.is_finished() {
                    break;
                }
            }
            if let Some(task) = parser.finalize()? {
                yield task;
            }
        }
    }
}
