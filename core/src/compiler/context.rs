//! Scratchpad and replan-context assembly across iterations.

use crate::executor::{render_trace, ExecutionResult, TraceStyle};

/// Context block for the next planner call:
///
/// ```text
/// 1. search("x")
/// Observation: ...
///
/// Thought: <joiner thought>
/// ```
pub fn replan_context(result: &ExecutionResult, joiner_thought: Option<&str>) -> String {
    let trace = render_trace(result, TraceStyle::CONTEXT).join("\n");
    format!("{}\n\nThought: {}", trace, joiner_thought.unwrap_or_default())
}

/// Every prior context labelled `Previous Plan:`, then `Current Plan:`.
pub fn format_contexts(contexts: &[String]) -> String {
    let mut formatted = String::new();
    for context in contexts {
        formatted.push_str("Previous Plan:\n\n");
        formatted.push_str(context);
        formatted.push_str("\n\n");
    }
    formatted.push_str("Current Plan:\n\n");
    formatted
}

/// Thought/action/observation trace the joiner reads, accumulated over
/// iterations.
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    text: String,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, result: &ExecutionResult) {
        self.text.push_str("\n\n");
        self.text
            .push_str(&render_trace(result, TraceStyle::SCRATCHPAD).concat());
        self.text = self.text.trim().to_string();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
