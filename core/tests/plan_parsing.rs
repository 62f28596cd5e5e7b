mod common;

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{chunks, test_registry, CallLog};
use planweave_core::api::{PlanError, PlanParser, StreamingPlanParser, Task};

const PLAN: &str = "Thought: gather both facts first\n\
1. search(\"capital of France\")\n\
2. lookup('population of $1')\n\
Here the model rambles a little.\n\
Thought: combine\n\
3. search(\"compare ${1} and $2\", 3) # extra comment\n\
4. join()\n\
<END_OF_PLAN>\n\
5. search(\"never parsed\")\n";

fn batch(text: &str) -> Vec<Task> {
    PlanParser::new(test_registry(&CallLog::default()))
        .parse(text)
        .unwrap()
        .into_values()
        .collect()
}

fn streamed(pieces: &[String]) -> Vec<Task> {
    let mut parser = StreamingPlanParser::new(test_registry(&CallLog::default()));
    let mut tasks = Vec::new();
    for piece in pieces {
        tasks.extend(parser.ingest_token(piece).unwrap());
    }
    tasks.extend(parser.finalize().unwrap());
    tasks
}

#[test]
fn example_search_then_join() {
    let tasks = batch("1. search(\"x\")\n2. join()\n<END_OF_PLAN>");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].name, "search");
    assert_eq!(tasks[0].args, vec![json!("x")]);
    assert!(tasks[0].dependencies.is_empty());
    assert!(tasks[1].is_join);
    assert_eq!(tasks[1].dependencies, BTreeSet::from([1]));
}

#[test]
fn example_reference_to_task_zero_is_not_a_dependency() {
    let tasks = batch("Thought: need data\n\n1. lookup($0)\n");
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].dependencies.is_empty());
    assert_eq!(tasks[0].thought.as_deref(), Some("need data"));
    assert_eq!(tasks[0].args, vec![json!("$0")]);
}

#[test]
fn indices_are_contiguous_and_dependencies_point_back() {
    let tasks = batch(PLAN);
    let indices: Vec<u32> = tasks.iter().map(|t| t.idx).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);

    for task in &tasks {
        assert!(task.dependencies.iter().all(|&d| d >= 1 && d < task.idx));
    }
    assert_eq!(tasks[1].dependencies, BTreeSet::from([1]));
    assert_eq!(tasks[2].dependencies, BTreeSet::from([1, 2]));
    assert_eq!(tasks[2].args, vec![json!("compare ${1} and $2"), json!(3)]);
    assert_eq!(tasks[2].thought.as_deref(), Some("combine"));
    assert_eq!(tasks[3].dependencies, BTreeSet::from([1, 2, 3]));
}

#[test]
fn streaming_char_by_char_matches_batch() {
    assert_eq!(streamed(&chunks(PLAN, 1)), batch(PLAN));
}

#[test]
fn streaming_with_uneven_chunks_matches_batch() {
    // Deterministic spread of chunk sizes, some spanning several lines.
    let sizes = [3usize, 17, 1, 8, 40, 2, 5, 64, 11];
    let chars: Vec<char> = PLAN.chars().collect();
    let mut pieces = Vec::new();
    let mut at = 0;
    for size in sizes.iter().cycle() {
        if at >= chars.len() {
            break;
        }
        let end = (at + size).min(chars.len());
        pieces.push(chars[at..end].iter().collect::<String>());
        at = end;
    }
    assert_eq!(streamed(&pieces), batch(PLAN));

    for n in [2, 7, 13, 29, PLAN.len()] {
        assert_eq!(streamed(&chunks(PLAN, n)), batch(PLAN), "chunk size {n}");
    }
}

#[test]
fn streaming_without_trailing_newline_matches_batch() {
    let text = "Thought: t\n1. search(\"a\")\n2. lookup(\"$1\")";
    assert_eq!(streamed(&chunks(text, 1)), batch(text));
    assert_eq!(batch(text).len(), 2);
}

#[test]
fn unknown_operation_fails_both_parsers() {
    let text = "1. search(\"a\")\n2. browse(\"b\")\n3. join()\n";
    let err = PlanParser::new(test_registry(&CallLog::default()))
        .parse(text)
        .unwrap_err();
    assert!(matches!(err, PlanError::OperationNotFound(ref name) if name == "browse"));

    let mut parser = StreamingPlanParser::new(test_registry(&CallLog::default()));
    let err = parser.ingest_token(text).unwrap_err();
    assert!(matches!(err, PlanError::OperationNotFound(_)));
}

#[test]
fn non_literal_argument_is_kept_verbatim() {
    let tasks = batch("1. search(look up \"quoted\" words)\n");
    assert_eq!(tasks[0].args, vec![json!("look up \"quoted\" words")]);
}
