use std::sync::Arc;

use crate::error::PlanError;
use crate::operation::OperationRegistry;

use super::lexer::{classify_line, Line};
use super::task::instantiate_task;
use super::types::Task;

/// Line-at-a-time plan matcher shared by the batch and streaming parsers.
///
/// Holds the current-thought slot and the next expected index. Once a join
/// task has been produced every further line is ignored.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    registry: Arc<OperationRegistry>,
    thought: Option<String>,
    next_idx: u32,
    finished: bool,
}

impl LineMatcher {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self {
            registry,
            thought: None,
            next_idx: 1,
            finished: false,
        }
    }

    /// Match one complete line. Returns the task it completes, if any.
    pub fn accept_line(&mut self, line: &str) -> Result<Option<Task>, PlanError> {
        if self.finished {
            return Ok(None);
        }

        match classify_line(line) {
            Line::Thought(text) => {
                self.thought = Some(text.to_string());
                Ok(None)
            }
            Line::Action(action) => {
                if action.idx != self.next_idx {
                    return Err(PlanError::MalformedPlan {
                        expected: self.next_idx,
                        found: action.idx,
                    });
                }
                let task = instantiate_task(
                    &self.registry,
                    action.idx,
                    action.name,
                    action.args,
                    self.thought.take(),
                )?;
                self.next_idx += 1;
                self.finished = task.is_join;
                Ok(Some(task))
            }
            Line::Other => Ok(None),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }
}
