mod traits;

pub use traits::{CompletionRequest, Oracle, TokenStream};
