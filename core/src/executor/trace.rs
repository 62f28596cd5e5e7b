//! Thought / action / observation rendering.

use super::types::{ExecutionResult, TaskRecord};

/// Which parts of a record to render.
#[derive(Debug, Clone, Copy)]
pub struct TraceStyle {
    pub include_thought: bool,
    pub include_idx: bool,
}

impl TraceStyle {
    /// Scratchpad form for the joiner: thoughts, no indices.
    pub const SCRATCHPAD: TraceStyle = TraceStyle {
        include_thought: true,
        include_idx: false,
    };

    /// Replan context form: thoughts and `N. ` indices.
    pub const CONTEXT: TraceStyle = TraceStyle {
        include_thought: true,
        include_idx: true,
    };
}

/// ```text
/// Thought: <thought>
/// [N. ]<action>
/// Observation: <observation>
/// ```
pub fn render_record(record: &TaskRecord, style: TraceStyle) -> String {
    let mut out = String::new();
    if style.include_thought {
        if let Some(thought) = record.thought.as_deref().filter(|t| !t.is_empty()) {
            out.push_str("Thought: ");
            out.push_str(thought);
            out.push('\n');
        }
    }
    if style.include_idx {
        out.push_str(&format!("{}. ", record.idx));
    }
    out.push_str(&record.action);
    out.push('\n');
    if let Some(observation) = &record.observation {
        out.push_str("Observation: ");
        out.push_str(observation);
        out.push('\n');
    }
    out
}

/// Render every non-join record in planned order.
pub fn render_trace(result: &ExecutionResult, style: TraceStyle) -> Vec<String> {
    result
        .action_records()
        .map(|record| render_record(record, style))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::TaskStatus;

    fn record(thought: Option<&str>) -> TaskRecord {
        TaskRecord {
            idx: 2,
            thought: thought.map(String::from),
            action: r#"search("x")"#.into(),
            observation: Some("found".into()),
            status: TaskStatus::Done,
            is_join: false,
            duration_ms: 1,
        }
    }

    #[test]
    fn scratchpad_style() {
        assert_eq!(
            render_record(&record(Some("look")), TraceStyle::SCRATCHPAD),
            "Thought: look\nsearch(\"x\")\nObservation: found\n"
        );
    }

    #[test]
    fn context_style_numbers_actions() {
        assert_eq!(
            render_record(&record(None), TraceStyle::CONTEXT),
            "2. search(\"x\")\nObservation: found\n"
        );
    }
}
