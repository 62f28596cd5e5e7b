use std::collections::BTreeMap;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use planweave_core::api::{CommandOperationConfig, Operation};

/// Operation that runs a local program.
///
/// The command line is the configured `args` followed by the task's
/// arguments. Trimmed stdout is the result.
pub struct CommandOperation {
    name: String,
    description: String,
    program: String,
    args: Vec<String>,
    working_dir: Option<String>,
    env: BTreeMap<String, String>,
}

impl CommandOperation {
    pub fn new(name: impl Into<String>, description: impl Into<String>, cfg: &CommandOperationConfig) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            working_dir: cfg.working_dir.clone(),
            env: cfg.env.clone(),
        }
    }
}

/// Strings pass through untouched; anything else is JSON encoded.
fn arg_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Operation for CommandOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .args(args.iter().map(arg_text))
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(
            target: "planweave.operation",
            stage = "operation.command.in",
            op = %self.name,
            program = %self.program,
            args = self.args.len() + args.len()
        );
        let output = cmd
            .output()
            .await
            .with_context(|| format!("{} failed to spawn {}", self.name, self.program))?;
        tracing::debug!(
            target: "planweave.operation",
            stage = "operation.command.out",
            op = %self.name,
            status = %output.status
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Value::String(stdout.trim().to_string()))
    }
}
