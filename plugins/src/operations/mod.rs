pub mod command;
pub mod http;

pub use command::CommandOperation;
pub use http::HttpOperation;
