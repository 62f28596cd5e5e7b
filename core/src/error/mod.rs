#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;
pub mod oracle;
pub mod plan;
pub mod registry;

pub use error::{CompilerError, ErrorCode};
pub use executor::ExecutorError;
pub use oracle::OracleError;
pub use plan::PlanError;
pub use registry::RegistryError;
