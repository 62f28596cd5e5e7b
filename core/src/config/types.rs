use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compiler::prompt::{DEFAULT_JOINER_PROMPT, DEFAULT_PLANNER_EXAMPLES};
use crate::compiler::DEFAULT_MAX_REPLANS;
use crate::executor::{FailurePolicy, SchedulerOptions};
use crate::plan::END_OF_PLAN;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub planner: PlannerSection,

    #[serde(default)]
    pub joiner: JoinerSection,

    #[serde(default)]
    pub compiler: CompilerSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory`.
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "planweave_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Directory for log files; `load_default` fills in `~/.planweave/logs`.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// HTTP oracle endpoint shared by the planner and the joiner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_oracle_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_oracle_url() -> String {
    "http://127.0.0.1:8080/v1/chat/completions".to_string()
}

fn default_oracle_timeout_ms() -> u64 {
    120_000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_url(),
            api_key: String::new(),
            timeout_ms: default_oracle_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub example_prompt: Option<String>,
    #[serde(default)]
    pub example_prompt_file: Option<String>,

    #[serde(default)]
    pub example_prompt_replan: Option<String>,
    #[serde(default)]
    pub example_prompt_replan_file: Option<String>,

    #[serde(default = "default_stop")]
    pub stop: Vec<String>,

    /// Parse and schedule the plan while the oracle is still writing it.
    #[serde(default)]
    pub stream: bool,
}

fn default_model() -> String {
    "default".to_string()
}

fn default_stop() -> Vec<String> {
    vec![END_OF_PLAN.to_string()]
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            example_prompt: None,
            example_prompt_file: None,
            example_prompt_replan: None,
            example_prompt_replan_file: None,
            stop: default_stop(),
            stream: false,
        }
    }
}

impl PlannerSection {
    pub fn example_prompt(&self) -> anyhow::Result<String> {
        Ok(resolve_text(&self.example_prompt, &self.example_prompt_file)?
            .unwrap_or_else(|| DEFAULT_PLANNER_EXAMPLES.to_string()))
    }

    pub fn example_prompt_replan(&self) -> anyhow::Result<Option<String>> {
        resolve_text(&self.example_prompt_replan, &self.example_prompt_replan_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinerSection {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub prompt_file: Option<String>,

    #[serde(default)]
    pub prompt_final: Option<String>,
    #[serde(default)]
    pub prompt_final_file: Option<String>,
}

impl Default for JoinerSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            prompt: None,
            prompt_file: None,
            prompt_final: None,
            prompt_final_file: None,
        }
    }
}

impl JoinerSection {
    pub fn prompt(&self) -> anyhow::Result<String> {
        Ok(resolve_text(&self.prompt, &self.prompt_file)?
            .unwrap_or_else(|| DEFAULT_JOINER_PROMPT.to_string()))
    }

    pub fn prompt_final(&self) -> anyhow::Result<Option<String>> {
        resolve_text(&self.prompt_final, &self.prompt_final_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerSection {
    #[serde(default = "default_max_replans")]
    pub max_replans: usize,

    /// Whole-schedule limit per iteration.
    #[serde(default)]
    pub schedule_timeout_ms: Option<u64>,
}

fn default_max_replans() -> usize {
    DEFAULT_MAX_REPLANS
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            max_replans: default_max_replans(),
            schedule_timeout_ms: None,
        }
    }
}

impl CompilerSection {
    pub fn schedule_timeout(&self) -> Option<Duration> {
        self.schedule_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    pub operation_timeout_ms: Option<u64>,

    #[serde(default)]
    pub progress: bool,
}

impl SchedulerSection {
    pub fn options(&self) -> SchedulerOptions {
        SchedulerOptions {
            failure_policy: self.failure_policy,
            operation_timeout: self.operation_timeout_ms.map(Duration::from_millis),
            progress: self.progress,
        }
    }
}

/// One `[[operations]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationConfig {
    pub name: String,

    /// Shown verbatim to the planner, e.g. `search(query: str) -> str`.
    pub description: String,

    #[serde(flatten)]
    pub kind: OperationKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OperationKind {
    #[serde(rename = "http")]
    Http(HttpOperationConfig),
    #[serde(rename = "command")]
    Command(CommandOperationConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpOperationConfig {
    pub url: String,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default = "default_operation_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOperationConfig {
    pub program: String,

    /// Fixed leading arguments; the task's arguments follow.
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub working_dir: Option<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_operation_timeout_ms() -> u64 {
    30_000
}

/// Inline text wins over a file path; neither set is `None`.
fn resolve_text(inline: &Option<String>, file: &Option<String>) -> anyhow::Result<Option<String>> {
    if let Some(text) = inline {
        return Ok(Some(text.clone()));
    }
    match file {
        Some(path) => {
            let text = std::fs::read_to_string(Path::new(path))
                .map_err(|e| anyhow::anyhow!("failed to read prompt file {path}: {e}"))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.compiler.max_replans, 2);
        assert_eq!(cfg.planner.stop, vec!["<END_OF_PLAN>".to_string()]);
        assert_eq!(cfg.scheduler.failure_policy, FailurePolicy::RecordAndContinue);
        assert!(cfg.operations.is_empty());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn operations_are_tagged_by_kind() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [scheduler]
            failure_policy = "abort"
            operation_timeout_ms = 500

            [[operations]]
            name = "search"
            description = "search(query: str) -> str"
            kind = "http"
            url = "http://localhost:9000/search"

            [[operations]]
            name = "word_count"
            description = "word_count(text: str) -> int"
            kind = "command"
            program = "wc"
            args = ["-w"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.operations.len(), 2);
        match &cfg.operations[0].kind {
            OperationKind::Http(http) => {
                assert_eq!(http.url, "http://localhost:9000/search");
                assert_eq!(http.timeout_ms, 30_000);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        match &cfg.operations[1].kind {
            OperationKind::Command(cmd) => assert_eq!(cmd.args, vec!["-w".to_string()]),
            other => panic!("unexpected kind: {other:?}"),
        }

        let opts = cfg.scheduler.options();
        assert_eq!(opts.failure_policy, FailurePolicy::Abort);
        assert_eq!(opts.operation_timeout, Some(Duration::from_millis(500)));
    }

    #[test]
    fn prompts_fall_back_to_defaults() {
        let section = JoinerSection::default();
        assert_eq!(section.prompt().unwrap(), DEFAULT_JOINER_PROMPT);
        assert_eq!(section.prompt_final().unwrap(), None);

        let section = PlannerSection {
            example_prompt: Some("EX".into()),
            ..Default::default()
        };
        assert_eq!(section.example_prompt().unwrap(), "EX");
    }

    #[test]
    fn prompt_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joiner.txt");
        std::fs::write(&path, "FROM FILE").unwrap();

        let section = JoinerSection {
            prompt_file: Some(path.to_string_lossy().to_string()),
            ..Default::default()
        };
        assert_eq!(section.prompt().unwrap(), "FROM FILE");
    }
}
