use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::Span;

use crate::error::OracleError;
use crate::oracle::{CompletionRequest, Oracle};

use super::prompt::{joiner_message, REPLAN_FALLBACK_ANSWER, REPLAN_MARKER};

const FINISH_PREFIX: &str = "Action: Finish(";

/// Parsed synthesis output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinerOutput {
    pub thought: Option<String>,
    pub answer: Option<String>,
    pub is_replan: bool,
}

fn thought_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Thought: (.*)\n\n").expect("thought regex"))
}

/// Parse joiner text of the form
///
/// ```text
/// Thought: <thought>
///
/// Action: Finish(<answer>) | Replan(<reason>)
/// ```
pub fn parse_joiner_output(raw: &str) -> JoinerOutput {
    let thought = thought_re()
        .captures(raw)
        .map(|caps| caps[1].to_string());
    let answer = extract_answer(raw);
    let is_replan = answer
        .as_deref()
        .is_some_and(|a| a.contains(REPLAN_MARKER));

    JoinerOutput {
        thought,
        answer,
        is_replan,
    }
}

/// Text inside the balanced `Action: Finish(...)`; without a Finish action,
/// the replan fallback if `Replan` appears anywhere.
pub fn extract_answer(raw: &str) -> Option<String> {
    let Some(start) = raw.find(FINISH_PREFIX) else {
        return raw
            .contains(REPLAN_MARKER)
            .then(|| REPLAN_FALLBACK_ANSWER.to_string());
    };

    let body = &raw[start + FINISH_PREFIX.len()..];
    let mut depth = 1usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(body[..i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Synthesis step: asks the oracle whether the trace answers the question.
pub struct Joiner {
    oracle: Arc<dyn Oracle>,
    model: String,
    prompt: String,
    prompt_final: String,
    span: Span,
}

impl Joiner {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        model: impl Into<String>,
        prompt: impl Into<String>,
        prompt_final: Option<String>,
        span: Span,
    ) -> Self {
        let prompt = prompt.into();
        Self {
            oracle,
            model: model.into(),
            prompt_final: prompt_final.unwrap_or_else(|| prompt.clone()),
            prompt,
            span,
        }
    }

    /// Run the joiner. Replanning is forced off when `is_final`.
    pub async fn join(
        &self,
        input: &str,
        scratchpad: &str,
        is_final: bool,
    ) -> Result<JoinerOutput, OracleError> {
        let instructions = if is_final { &self.prompt_final } else { &self.prompt };
        let request = CompletionRequest::new(
            self.model.clone(),
            joiner_message(instructions, input, scratchpad),
        );

        tracing::debug!(
            target: "planweave.joiner",
            parent: &self.span,
            oracle = self.oracle.name(),
            is_final,
            "joiner request"
        );
        let raw = self.oracle.complete(&request).await?;
        tracing::debug!(target: "planweave.joiner", parent: &self.span, raw = %raw, "joiner response");

        let mut output = parse_joiner_output(&raw);
        if is_final {
            output.is_replan = false;
        }
        Ok(output)
    }
}
