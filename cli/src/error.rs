use thiserror::Error;

use planweave_core::api::{CompilerError, ErrorCode, ExecutorError, PlanError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Compiler(#[from] CompilerError),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    // 0: success
    // 11: config error or unreadable input
    // 12: plan error
    // 20: oracle error
    // 30: execution error (timeouts included)
    // 50: internal/uncategorized
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Io(_) => 11,
            CliError::Compiler(e) => match e.error_code() {
                ErrorCode::Success => 0,
                ErrorCode::ConfigError => 11,
                ErrorCode::PlanError => 12,
                ErrorCode::OracleError => 20,
                ErrorCode::ExecutionError | ErrorCode::Timeout => 30,
                ErrorCode::GeneralError => 50,
            },
            CliError::Plan(PlanError::Oracle(_)) => 20,
            CliError::Plan(_) => 12,
            CliError::Executor(ExecutorError::Plan(_)) => 12,
            CliError::Executor(_) => 30,
            CliError::Anyhow(_) => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planweave_core::api::OracleError;

    #[test]
    fn exit_codes_follow_categories() {
        assert_eq!(CliError::Config("bad".into()).exit_code(), 11);
        assert_eq!(
            CliError::Plan(PlanError::OperationNotFound("x".into())).exit_code(),
            12
        );
        assert_eq!(
            CliError::Compiler(CompilerError::Oracle(OracleError::Request("down".into()))).exit_code(),
            20
        );
        assert_eq!(
            CliError::Compiler(CompilerError::Executor(ExecutorError::ScheduleTimeout(5))).exit_code(),
            30
        );
        assert_eq!(CliError::Executor(ExecutorError::DuplicateTaskIdx(1)).exit_code(), 30);
        assert_eq!(CliError::Anyhow(anyhow::anyhow!("boom")).exit_code(), 50);
    }
}
