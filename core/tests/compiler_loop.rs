mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;

use common::{test_registry, CallLog, ScriptedOracle};
use planweave_core::api::{Compiler, CompilerError, ErrorCode, ExecutorError};
use planweave_core::compiler::prompt::REPLAN_FALLBACK_ANSWER;
use planweave_core::compiler::{parse_joiner_output, JoinerOutput};

const PLAN: &str = "Thought: look both up\n1. search(\"a\")\n2. lookup(\"$1!\")\n3. join()\n<END_OF_PLAN>";
const FINISH: &str = "Thought: found it\n\nAction: Finish(42)";
const REPLAN: &str = "Thought: not enough\n\nAction: Replan(try a different query)";

#[test]
fn joiner_examples() {
    assert_eq!(
        parse_joiner_output(FINISH),
        JoinerOutput {
            thought: Some("found it".into()),
            answer: Some("42".into()),
            is_replan: false,
        }
    );
    let replan = parse_joiner_output("Thought: hmm\n\nAction: Replan(try again)");
    assert_eq!(replan.answer.as_deref(), Some(REPLAN_FALLBACK_ANSWER));
    assert!(replan.is_replan);
}

#[tokio::test]
async fn finishes_on_first_iteration() {
    let log = CallLog::default();
    let oracle = ScriptedOracle::new([PLAN, FINISH]);
    let compiler = Compiler::builder()
        .registry(test_registry(&log))
        .oracle(oracle.clone())
        .build()
        .unwrap();

    let out = compiler.run("what is it?").await.unwrap();
    assert_eq!(out.output.as_deref(), Some("42"));
    assert_eq!(out.iterations, 1);

    let prompts = oracle.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].ends_with("\n\nQuestion: what is it?"));
    assert!(prompts[1].contains(
        "Question: what is it?\n\nThought: look both up\nsearch(\"a\")\nObservation: a\nlookup(\"a!\")\nObservation: a!\n"
    ));
}

#[tokio::test]
async fn always_replanning_stops_after_max_replans() {
    let log = CallLog::default();
    let oracle = ScriptedOracle::new([PLAN, REPLAN, PLAN, REPLAN, PLAN, REPLAN]);
    let compiler = Compiler::builder()
        .registry(test_registry(&log))
        .oracle(oracle.clone())
        .max_replans(3)
        .build()
        .unwrap();

    let out = compiler.run("q").await.unwrap();
    assert_eq!(out.iterations, 3);
    // The final iteration's replan request is ignored and its answer kept.
    assert_eq!(out.output.as_deref(), Some(REPLAN_FALLBACK_ANSWER));
    assert_eq!(oracle.prompts().len(), 6);

    let second_plan = &oracle.prompts()[2];
    assert!(second_plan.contains("\"Previous Plan\""));
    assert!(second_plan.contains(
        "Question: q\nPrevious Plan:\n\nThought: look both up\n1. search(\"a\")\nObservation: a\n\n2. lookup(\"a!\")\nObservation: a!\n\n\nThought: not enough\n\nCurrent Plan:\n\n\n"
    ));

    let third_plan = &oracle.prompts()[4];
    assert_eq!(third_plan.matches("Previous Plan:\n\n").count(), 2);
}

#[tokio::test]
async fn undefined_answer_stops_without_output() {
    let log = CallLog::default();
    let oracle = ScriptedOracle::new([PLAN, "I am not sure."]);
    let compiler = Compiler::builder()
        .registry(test_registry(&log))
        .oracle(oracle)
        .build()
        .unwrap();

    let out = compiler.run("q").await.unwrap();
    assert_eq!(out.output, None);
    assert_eq!(out.iterations, 1);
}

#[tokio::test]
async fn streaming_mode_matches_batch_mode() {
    let batch_oracle = ScriptedOracle::new([PLAN, FINISH]);
    let batch = Compiler::builder()
        .registry(test_registry(&CallLog::default()))
        .oracle(batch_oracle.clone())
        .build()
        .unwrap();
    let batch_out = batch.run("q").await.unwrap();

    let stream_oracle = ScriptedOracle::chunked([PLAN, FINISH], 3);
    let streaming = Compiler::builder()
        .registry(test_registry(&CallLog::default()))
        .oracle(stream_oracle.clone())
        .streaming(true)
        .build()
        .unwrap();
    let stream_out = streaming.run("q").await.unwrap();

    assert_eq!(stream_out.output, batch_out.output);
    assert_eq!(stream_oracle.prompts(), batch_oracle.prompts());
}

#[tokio::test]
async fn final_iteration_uses_the_final_joiner_prompt() {
    let planner = ScriptedOracle::new([PLAN, PLAN]);
    let joiner = ScriptedOracle::new([REPLAN, FINISH]);
    let compiler = Compiler::builder()
        .registry(test_registry(&CallLog::default()))
        .planner_oracle(planner)
        .joiner_oracle(joiner.clone())
        .joiner_prompt("JOIN")
        .joiner_prompt_final(Some("FINAL".into()))
        .build()
        .unwrap();

    let out = compiler.run("q").await.unwrap();
    assert_eq!(out.output.as_deref(), Some("42"));
    assert_eq!(out.iterations, 2);

    let prompts = joiner.prompts();
    assert!(prompts[0].starts_with("JOIN\nQuestion: q\n\n"));
    assert!(prompts[1].starts_with("FINAL\nQuestion: q\n\n"));
}

#[tokio::test]
async fn schedule_timeout_is_an_error() {
    let oracle = ScriptedOracle::new(["1. slow()\n2. join()\n", FINISH]);
    let compiler = Compiler::builder()
        .registry(test_registry(&CallLog::default()))
        .oracle(oracle)
        .schedule_timeout(Some(Duration::from_millis(50)))
        .build()
        .unwrap();

    let err = compiler.run("q").await.unwrap_err();
    assert!(matches!(err, CompilerError::Executor(ExecutorError::ScheduleTimeout(50))));
    assert_eq!(err.error_code(), ErrorCode::Timeout);
}

#[tokio::test]
async fn planner_oracle_failure_maps_to_oracle_error() {
    let oracle = ScriptedOracle::new(Vec::<String>::new());
    let compiler = Compiler::builder()
        .registry(test_registry(&CallLog::default()))
        .oracle(oracle)
        .build()
        .unwrap();

    let err = compiler.run("q").await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::OracleError);
}

#[tokio::test]
async fn unknown_operation_in_plan_is_fatal() {
    let oracle = ScriptedOracle::new(["1. browse(\"x\")\n2. join()\n", FINISH]);
    let compiler = Compiler::builder()
        .registry(test_registry(&CallLog::default()))
        .oracle(oracle)
        .build()
        .unwrap();

    let err = compiler.run("q").await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::PlanError);
}
