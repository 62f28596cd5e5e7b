use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use planweave_core::api::{HttpOperationConfig, Operation};

use crate::util::preview_body;

/// Operation backed by an HTTP endpoint.
///
/// Each invocation POSTs `{"args": [...]}`. A JSON response becomes the
/// result as-is, any other body is returned as a string.
pub struct HttpOperation {
    name: String,
    description: String,
    url: String,
    headers: BTreeMap<String, String>,
    http: reqwest::Client,
}

impl HttpOperation {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        cfg: &HttpOperationConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self {
            name: name.into(),
            description: description.into(),
            url: cfg.url.clone(),
            headers: cfg.headers.clone(),
            http,
        })
    }
}

#[async_trait]
impl Operation for HttpOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        tracing::debug!(
            target: "planweave.operation",
            stage = "operation.http.in",
            op = %self.name,
            url = %self.url,
            args = args.len()
        );
        let mut req = self.http.post(&self.url).json(&json!({ "args": args }));
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("{} request to {} failed", self.name, self.url))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("{} failed to read response body", self.name))?;
        tracing::debug!(target: "planweave.operation", stage = "operation.http.out", op = %self.name, status = %status);

        if !status.is_success() {
            return Err(anyhow!(
                "{} returned HTTP {}: {}",
                self.name,
                status.as_u16(),
                preview_body(&body)
            ));
        }

        Ok(serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body)))
    }
}
