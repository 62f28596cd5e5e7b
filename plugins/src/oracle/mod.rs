pub mod http;
pub mod sse;

pub use http::HttpOracle;
pub use sse::{SseDecoder, SseEvent};
