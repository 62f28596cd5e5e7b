use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "planweave", version, about = "Plan, run in parallel, and answer")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file. Defaults to ~/.planweave/config.toml, then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question with the full plan/execute/join loop.
    Run(RunArgs),
    /// Parse a plan file offline and show its tasks and parallel stages.
    Plan(PlanArgs),
    /// Print the planner prompt built from the configured operations.
    Prompt(PromptArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    #[arg(group = "input")]
    pub question: Option<String>,

    #[arg(long, group = "input")]
    pub question_file: Option<PathBuf>,

    #[arg(long, group = "input")]
    pub stdin: bool,

    /// Schedule tasks while the plan is still streaming in.
    #[arg(long)]
    pub stream: bool,

    #[arg(long)]
    pub max_replans: Option<usize>,

    #[arg(long)]
    pub planner_model: Option<String>,

    #[arg(long)]
    pub joiner_model: Option<String>,

    /// Show a progress bar while tasks run (stderr must be a terminal).
    #[arg(long)]
    pub progress: bool,

    /// Print the run result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    /// Plan text file, or `-` for stdin.
    pub file: PathBuf,

    /// Declare an operation name for parsing only. Can be repeated.
    #[arg(long = "op", action = clap::ArgAction::Append)]
    pub ops: Vec<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PromptArgs {
    /// Include the replanning guidance.
    #[arg(long)]
    pub replan: bool,

    /// Append the question block exactly as the planner would receive it.
    #[arg(long)]
    pub question: Option<String>,
}
