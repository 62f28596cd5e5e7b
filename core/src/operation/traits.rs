use async_trait::async_trait;
use serde_json::Value;

/// An invocable operation that plans refer to by name.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Unique, identifier-safe name used in plan text.
    fn name(&self) -> &str;

    /// Description placed verbatim in the planning prompt.
    fn description(&self) -> &str;

    /// Run the operation with fully resolved arguments.
    async fn invoke(&self, args: Vec<Value>) -> anyhow::Result<Value>;

    /// Render a result for placeholder substitution and observations.
    fn stringify(&self, result: &Value) -> String {
        default_stringify(result)
    }
}

/// Strings render verbatim, everything else as compact JSON.
pub fn default_stringify(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_stringify_keeps_strings_raw() {
        assert_eq!(default_stringify(&json!("R2")), "R2");
        assert_eq!(default_stringify(&json!(42)), "42");
        assert_eq!(default_stringify(&json!([1, "a"])), r#"[1,"a"]"#);
        assert_eq!(default_stringify(&Value::Null), "null");
    }
}
