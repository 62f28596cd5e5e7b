pub mod factory;
pub mod operations;
pub mod oracle;
mod util;
