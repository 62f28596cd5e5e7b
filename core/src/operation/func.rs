use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use super::traits::{default_stringify, Operation};

type InvokeFn = dyn Fn(Vec<Value>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync;
type StringifyFn = dyn Fn(&Value) -> String + Send + Sync;

/// Operation backed by an async closure, for user callables.
///
/// ```rust,ignore
/// let double = FnOperation::new("double", "double(x: int) -> int", |args| async move {
///     let x = args.first().and_then(|v| v.as_i64()).unwrap_or_default();
///     Ok(serde_json::json!(x * 2))
/// });
/// ```
#[derive(Clone)]
pub struct FnOperation {
    name: String,
    description: String,
    invoke: Arc<InvokeFn>,
    stringify: Option<Arc<StringifyFn>>,
}

impl FnOperation {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            invoke: Arc::new(move |args| f(args).boxed()),
            stringify: None,
        }
    }

    /// Override how results are rendered into dependents and observations.
    pub fn with_stringify<S>(mut self, stringify: S) -> Self
    where
        S: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.stringify = Some(Arc::new(stringify));
        self
    }
}

impl fmt::Debug for FnOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .field("custom_stringify", &self.stringify.is_some())
            .finish()
    }
}

#[async_trait]
impl Operation for FnOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        (self.invoke)(args).await
    }

    fn stringify(&self, result: &Value) -> String {
        match &self.stringify {
            Some(rule) => rule(result),
            None => default_stringify(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn invokes_closure_with_args() {
        let op = FnOperation::new("add", "add(a, b)", |args| async move {
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(json!(sum))
        });
        assert_eq!(op.name(), "add");
        assert_eq!(op.invoke(vec![json!(2), json!(3)]).await.unwrap(), json!(5));
    }

    #[test]
    fn custom_stringify_overrides_default() {
        let op = FnOperation::new("noop", "noop()", |_| async { Ok(Value::Null) })
            .with_stringify(|v| format!("<{v}>"));
        assert_eq!(op.stringify(&json!(1)), "<1>");
    }
}
