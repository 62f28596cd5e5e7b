use thiserror::Error;

use crate::compiler::TransitionError;

use super::{ExecutorError, OracleError, PlanError, RegistryError};

/// Coarse error categories, used by the binary to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    ConfigError = 11,
    PlanError = 12,
    OracleError = 20,
    ExecutionError = 30,
    Timeout = 31,
    GeneralError = 50,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Errors surfaced by `Compiler::run`.
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("config error: {0}")]
    Config(String),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),

    #[error("joiner oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("compiler loop error: {0}")]
    Phase(#[from] TransitionError),
}

impl CompilerError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(_) | Self::Registry(_) => ErrorCode::ConfigError,
            Self::Plan(PlanError::Oracle(_)) | Self::Oracle(_) => ErrorCode::OracleError,
            Self::Plan(_) => ErrorCode::PlanError,
            Self::Executor(ExecutorError::Plan(PlanError::Oracle(_))) => ErrorCode::OracleError,
            Self::Executor(ExecutorError::Plan(_)) => ErrorCode::PlanError,
            Self::Executor(ExecutorError::ScheduleTimeout(_)) => ErrorCode::Timeout,
            Self::Executor(_) => ErrorCode::ExecutionError,
            Self::Phase(_) => ErrorCode::GeneralError,
        }
    }
}
