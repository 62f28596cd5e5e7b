use std::sync::Arc;

use crate::error::PlanError;
use crate::operation::OperationRegistry;

use super::matcher::LineMatcher;
use super::types::Task;

/// Incremental plan parser fed oracle tokens as they arrive.
///
/// Tokens are buffered until a line break completes a line; every completed
/// line goes through the same [`LineMatcher`] as [`super::PlanParser`].
#[derive(Debug, Clone)]
pub struct StreamingPlanParser {
    matcher: LineMatcher,
    buffer: String,
}

impl StreamingPlanParser {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self {
            matcher: LineMatcher::new(registry),
            buffer: String::new(),
        }
    }

    /// Feed one token; returns the tasks it completed.
    pub fn ingest_token(&mut self, token: &str) -> Result<Vec<Task>, PlanError> {
        if self.matcher.is_finished() {
            return Ok(Vec::new());
        }

        let mut tasks = Vec::new();
        let mut rest = token;
        while let Some(pos) = rest.find('\n') {
            self.buffer.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];

            let line = std::mem::take(&mut self.buffer);
            if let Some(task) = self.matcher.accept_line(&line)? {
                tasks.push(task);
            }
            if self.matcher.is_finished() {
                return Ok(tasks);
            }
        }
        self.buffer.push_str(rest);
        Ok(tasks)
    }

    /// Flush the buffered partial line at end of input.
    pub fn finalize(&mut self) -> Result<Option<Task>, PlanError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let mut tasks = self.ingest_token("\n")?;
        Ok(tasks.pop())
    }

    /// True once a join task has been emitted.
    pub fn is_finished(&self) -> bool {
        self.matcher.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{FnOperation, Operation};
    use serde_json::Value;

    fn registry() -> Arc<OperationRegistry> {
        let op: Arc<dyn Operation> =
            Arc::new(FnOperation::new("search", "search", |_| async { Ok(Value::Null) }));
        Arc::new(OperationRegistry::new(vec![op]).unwrap())
    }

    #[test]
    fn token_without_break_only_buffers() {
        let mut parser = StreamingPlanParser::new(registry());
        assert!(parser.ingest_token("1. search(").unwrap().is_empty());
        assert!(parser.ingest_token("\"a\")").unwrap().is_empty());
        let tasks = parser.ingest_token("\n2. jo").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].idx, 1);
    }

    #[test]
    fn multi_line_token_yields_several_tasks() {
        let mut parser = StreamingPlanParser::new(registry());
        let tasks = parser
            .ingest_token("1. search(\"a\")\n2. search(\"b\")\n3. join()\n4. search(\"c\")\n")
            .unwrap();
        assert_eq!(tasks.iter().map(|t| t.idx).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(parser.is_finished());
        assert!(parser.ingest_token("5. search(\"d\")\n").unwrap().is_empty());
        assert!(parser.finalize().unwrap().is_none());
    }

    #[test]
    fn finalize_flushes_last_line() {
        let mut parser = StreamingPlanParser::new(registry());
        assert!(parser.ingest_token("1. search(\"a\")").unwrap().is_empty());
        let task = parser.finalize().unwrap().unwrap();
        assert_eq!(task.idx, 1);
        assert!(parser.finalize().unwrap().is_none());
    }
}
