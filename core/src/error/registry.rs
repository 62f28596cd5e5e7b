use thiserror::Error;

/// Errors raised while building an operation registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate operation name: {0}")]
    DuplicateOperation(String),

    #[error("operation name '{0}' is reserved")]
    ReservedName(String),

    #[error("invalid operation name '{0}': expected [A-Za-z0-9_]+")]
    InvalidName(String),
}
