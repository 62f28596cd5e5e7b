//! Prompt assembly for the planner and the joiner.

use crate::operation::OperationRegistry;
use crate::plan::END_OF_PLAN;

pub const JOIN_DESCRIPTION: &str = "join():\n \
- Collects and combines results from prior actions.\n \
- A LLM agent is called upon invoking join to either finalize the user query or wait until the plans are executed.\n \
- join should always be the last action in the plan, and will be called in two scenarios:\n   \
(a) if the answer can be determined by gathering the outputs from tasks to generate the final response.\n   \
(b) if the answer cannot be determined in the planning phase before you execute the plans. ";

/// Sentinel the joiner writes to ask for another planning round.
pub const REPLAN_MARKER: &str = "Replan";

/// Answer used when the joiner replans without a `Finish` action.
pub const REPLAN_FALLBACK_ANSWER: &str = "Replan required. Consider rephrasing your question.";

pub const DEFAULT_PLANNER_EXAMPLES: &str = r#"Question: What is the population of the capital of France, doubled?
Thought: First find the capital, then its population, then double it.
1. search("capital of France")
2. search("population of $1")
3. math("$2 * 2")
Thought: I can answer now.
4. join()
<END_OF_PLAN>
###
Question: Which is taller, the Eiffel Tower or the Tokyo Tower?
1. search("Eiffel Tower height")
2. search("Tokyo Tower height")
3. join()
<END_OF_PLAN>
###
"#;

pub const DEFAULT_JOINER_PROMPT: &str = r#"Solve a question answering task. Here are some guidelines:
 - In the Assistant Scratchpad, you will be given results of a plan you have executed to answer the user's question.
 - Thought needs to reason about the question based on the Observations in 1-2 sentences.
 - Ignore irrelevant action results.
 - If the required information is present, give a concise but complete and helpful answer to the user's question.
 - If you are unable to give a satisfactory finishing answer, replan to get the required information. Respond in the following format:

Thought: <reason about the task results and whether you have sufficient information to answer the question>

Action: <action to take>

Available actions:
 (1) Finish(the final answer to return to the user): returns the answer and finishes the task.
 (2) Replan(the reasoning and other information that will help you plan again. Can be a line of any length): instructs why we must replan

Here are some examples:

Question: What is the capital of France?
search("capital of France")
Observation: Paris is the capital of France.
Thought: The observation names the capital directly.

Action: Finish(Paris)
###

Question: How old is the current CEO of Acme?
search("Acme CEO")
Observation: No results.
Thought: The search returned nothing, so I need a different query.

Action: Replan(search for the Acme leadership page instead)
###
"#;

/// System prompt for the planner.
///
/// Operations are numbered in registry order with join last, followed by
/// the planning guidelines, replan guidance when `is_replan`, then examples.
pub fn planner_prompt(registry: &OperationRegistry, example_prompt: &str, is_replan: bool) -> String {
    let mut prompt = format!(
        "Given a user query, create a plan to solve it with the utmost parallelizability. \
         Each plan should comprise an action from the following {} types:\n",
        registry.len() + 1
    );

    for (i, op) in registry.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, op.description()));
    }
    prompt.push_str(&format!("{}. {}\n\n", registry.len() + 1, JOIN_DESCRIPTION));

    prompt.push_str("Guidelines:\n");
    prompt.push_str(" - Each action described above contains input/output types and description.\n");
    prompt.push_str("    - You must strictly adhere to the input and output types for each action.\n");
    prompt.push_str(
        "    - The action descriptions contain the guidelines. You MUST strictly follow those guidelines when you use the actions.\n",
    );
    prompt.push_str(
        " - Each action in the plan should strictly be one of the above types. Follow the Python conventions for each action.\n",
    );
    prompt.push_str(" - Each action MUST have a unique ID, which is strictly increasing.\n");
    prompt.push_str(
        " - Inputs for actions can either be constants or outputs from preceding actions. \
         In the latter case, use the format $id to denote the ID of the previous action whose output will be the input.\n",
    );
    prompt.push_str(&format!(
        " - Always call join as the last action in the plan. Say '{END_OF_PLAN}' after you call join\n"
    ));
    prompt.push_str(" - Ensure the plan maximizes parallelizability.\n");
    prompt.push_str(
        " - Only use the provided action types. If a query cannot be addressed using these, invoke the join action for the next steps.\n",
    );
    prompt.push_str(" - Never explain the plan with comments (e.g. #).\n");
    prompt.push_str(" - Never introduce new actions other than the ones provided.\n\n");

    if is_replan {
        prompt.push_str(
            " - You are given \"Previous Plan\" which is the plan that the previous agent created along with the execution results \
             (given as Observation) of each plan and a general thought (given as Thought) about the executed results. \
             You MUST use these information to create the next plan under \"Current Plan\".\n",
        );
        prompt.push_str(
            " - When starting the Current Plan, you should start with \"Thought\" that outlines the strategy for the next plan.\n",
        );
        prompt.push_str(
            " - In the Current Plan, you should NEVER repeat the actions that are already executed in the Previous Plan.\n",
        );
    }

    prompt.push_str("Here are some examples:\n\n");
    prompt.push_str(example_prompt);
    prompt
}

/// `Question: <input>`, plus the formatted contexts when replanning.
pub fn planner_human_prompt(input: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("Question: {input}\n{context}\n"),
        None => format!("Question: {input}"),
    }
}

/// Full planner message: system prompt, blank line, human prompt.
pub fn planner_message(system: &str, input: &str, context: Option<&str>) -> String {
    format!("{system}\n\n{}", planner_human_prompt(input, context))
}

pub fn joiner_message(instructions: &str, input: &str, scratchpad: &str) -> String {
    format!("{instructions}\nQuestion: {input}\n\n{scratchpad}\n")
}
