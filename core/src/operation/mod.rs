//! Operations a plan may invoke, and the registry the parsers resolve names against.

mod func;
mod registry;
mod traits;

pub use func::FnOperation;
pub use registry::{is_identifier, OperationRegistry, JOIN_OPERATION};
pub use traits::{default_stringify, Operation};
