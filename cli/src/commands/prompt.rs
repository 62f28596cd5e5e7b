use planweave_core::api::AppConfig;
use planweave_core::compiler::prompt::{planner_message, planner_prompt};

use super::registry_from_config;
use crate::cli::PromptArgs;
use crate::error::CliError;

pub fn prompt_cmd(args: PromptArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    println!("{}", build_prompt(&args, cfg)?);
    Ok(0)
}

pub fn build_prompt(args: &PromptArgs, cfg: &AppConfig) -> Result<String, CliError> {
    let registry = registry_from_config(cfg)?;
    let config_err = |e: anyhow::Error| CliError::Config(format!("{e:#}"));

    let examples = if args.replan {
        cfg.planner
            .example_prompt_replan()
            .map_err(config_err)?
            .map_or_else(|| cfg.planner.example_prompt(), Ok)
            .map_err(config_err)?
    } else {
        cfg.planner.example_prompt().map_err(config_err)?
    };

    let system = planner_prompt(&registry, &examples, args.replan);
    Ok(match &args.question {
        Some(question) => planner_message(&system, question, None),
        None => system,
    })
}
