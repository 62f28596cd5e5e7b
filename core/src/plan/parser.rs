use std::sync::Arc;

use crate::error::PlanError;
use crate::operation::OperationRegistry;

use super::matcher::LineMatcher;
use super::types::Plan;

/// Whole-text plan parser.
#[derive(Debug, Clone)]
pub struct PlanParser {
    registry: Arc<OperationRegistry>,
}

impl PlanParser {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry }
    }

    /// Parse `text` into a plan, stopping at the first join task.
    pub fn parse(&self, text: &str) -> Result<Plan, PlanError> {
        let mut matcher = LineMatcher::new(self.registry.clone());
        let mut plan = Plan::new();

        for line in text.split('\n') {
            if let Some(task) = matcher.accept_line(line)? {
                plan.insert(task.idx, task);
            }
            if matcher.is_finished() {
                break;
            }
        }
        Ok(plan)
    }
}
