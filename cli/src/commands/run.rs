use std::sync::Arc;

use tokio::io::AsyncReadExt;

use planweave_core::api::{AppConfig, Compiler, CompilerOutput};
use planweave_plugins::factory::build_oracle;

use super::registry_from_config;
use crate::cli::RunArgs;
use crate::error::CliError;

pub async fn run_cmd(args: RunArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let question = read_question(&args).await?;
    let compiler = build_compiler(cfg, &args)?;

    let out = compiler.run(question.trim()).await?;
    print_output(&out, args.json)?;
    Ok(0)
}

/// Config values with command-line flags layered on top.
pub fn build_compiler(cfg: &AppConfig, args: &RunArgs) -> Result<Compiler, CliError> {
    let registry = registry_from_config(cfg)?;
    let oracle = build_oracle(&cfg.oracle).map_err(|e| CliError::Config(format!("{e:#}")))?;

    let mut scheduler = cfg.scheduler.options();
    scheduler.progress = (scheduler.progress || args.progress) && atty::is(atty::Stream::Stderr);

    let config_err = |e: anyhow::Error| CliError::Config(format!("{e:#}"));
    let compiler = Compiler::builder()
        .registry(Arc::new(registry))
        .oracle(oracle)
        .planner_model(args.planner_model.clone().unwrap_or_else(|| cfg.planner.model.clone()))
        .joiner_model(args.joiner_model.clone().unwrap_or_else(|| cfg.joiner.model.clone()))
        .example_prompt(cfg.planner.example_prompt().map_err(config_err)?)
        .example_prompt_replan(cfg.planner.example_prompt_replan().map_err(config_err)?)
        .stop(cfg.planner.stop.clone())
        .joiner_prompt(cfg.joiner.prompt().map_err(config_err)?)
        .joiner_prompt_final(cfg.joiner.prompt_final().map_err(config_err)?)
        .max_replans(args.max_replans.unwrap_or(cfg.compiler.max_replans))
        .streaming(args.stream || cfg.planner.stream)
        .scheduler(scheduler)
        .schedule_timeout(cfg.compiler.schedule_timeout())
        .build()?;
    Ok(compiler)
}

async fn read_question(args: &RunArgs) -> Result<String, CliError> {
    if let Some(q) = &args.question {
        return Ok(q.clone());
    }
    if let Some(path) = &args.question_file {
        return Ok(tokio::fs::read_to_string(path).await?);
    }
    if args.stdin || !atty::is(atty::Stream::Stdin) {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    Err(CliError::Config(
        "no question given; pass it as an argument, --question-file or --stdin".to_string(),
    ))
}

fn print_output(out: &CompilerOutput, json: bool) -> Result<(), CliError> {
    if json {
        let text = serde_json::to_string_pretty(out).map_err(anyhow::Error::from)?;
        println!("{text}");
        return Ok(());
    }
    match &out.output {
        Some(answer) => println!("{answer}"),
        None => eprintln!("no answer after {} iteration(s)", out.iterations),
    }
    Ok(())
}
