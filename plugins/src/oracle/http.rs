use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use planweave_core::api::{CompletionRequest, Oracle, OracleConfig, OracleError, TokenStream};

use super::sse::{delta_text, looks_like_sse, SseDecoder, SseEvent};
use crate::util::preview_body;

/// Chat-completions client.
///
/// Batch responses may be plain JSON or an SSE transcript (some servers
/// stream regardless of the `stream` flag); both are reduced to text.
#[derive(Clone)]
pub struct HttpOracle {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpOracle {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(cfg: &OracleConfig) -> anyhow::Result<Self> {
        Self::new(cfg.base_url.clone(), cfg.api_key.clone(), cfg.timeout_ms)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn payload(request: &CompletionRequest, stream: bool) -> Value {
        json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "stop": request.stop,
            "stream": stream,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    async fn send(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response, OracleError> {
        tracing::debug!(
            target: "planweave.oracle",
            stage = "oracle.http.in",
            url = %self.url,
            model = %request.model,
            prompt_len = request.prompt.len(),
            stream
        );
        let req = self.http.post(&self.url).json(&Self::payload(request, stream));
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| OracleError::Request(format!("{}: {}", self.url, err)))?;

        let status = resp.status();
        tracing::debug!(target: "planweave.oracle", stage = "oracle.http.out", status = %status);
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: preview_body(&body),
            });
        }
        Ok(resp)
    }
}

/// Reduce a full response body to completion text.
pub fn decode_body(body: &str) -> Result<String, OracleError> {
    if looks_like_sse(body) {
        let mut decoder = SseDecoder::new();
        let mut events = decoder.push(body.as_bytes());
        events.extend(decoder.finish());

        let mut text = String::new();
        for event in events {
            match event {
                SseEvent::Done => break,
                SseEvent::Data(data) => {
                    let chunk: Value = serde_json::from_str(&data)
                        .map_err(|err| OracleError::Decode(format!("{err} | chunk={}", preview_body(&data))))?;
                    if let Some(piece) = delta_text(&chunk) {
                        text.push_str(piece);
                    }
                }
            }
        }
        return Ok(text);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        // Non-JSON bodies are taken as the completion itself.
        Err(_) => return Ok(body.to_string()),
    };
    extract_textish(&value)
        .map(str::to_string)
        .ok_or_else(|| OracleError::Decode(format!("no completion text in body={}", preview_body(body))))
}

fn extract_textish(v: &Value) -> Option<&str> {
    // OpenAI-ish: { choices: [ { message: { content: "..." } } ] }
    let choice = v.get("choices").and_then(|c| c.get(0));
    choice
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .or_else(|| choice.and_then(|c| c.get("text")).and_then(Value::as_str))
        .or_else(|| v.get("text").and_then(Value::as_str))
}

#[async_trait]
impl Oracle for HttpOracle {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let resp = self.send(request, false).await?;
        let body = resp
            .text()
            .await
            .map_err(|err| OracleError::Request(format!("{}: {}", self.url, err)))?;
        decode_body(&body)
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<TokenStream, OracleError> {
        let resp = self.send(request, true).await?;

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        if is_json {
            // Server ignored the stream flag.
            let body = resp
                .text()
                .await
                .map_err(|err| OracleError::Request(format!("{}: {}", self.url, err)))?;
            let text = decode_body(&body)?;
            return Ok(futures::stream::once(async move { Ok(text) }).boxed());
        }

        let mut bytes = resp.bytes_stream();
        let stream = async_stream::try_stream! {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|err| OracleError::Stream(err.to_string()))?;
                for event in decoder.push(&chunk) {
                    if let SseEvent::Data(data) = event {
                        if let Some(piece) = decode_chunk(&data)? {
                            yield piece;
                        }
                    }
                }
                if decoder.is_done() {
                    break;
                }
            }
            for event in decoder.finish() {
                if let SseEvent::Data(data) = event {
                    if let Some(piece) = decode_chunk(&data)? {
                        yield piece;
                    }
                }
            }
        };
        Ok(stream.boxed())
    }
}

fn decode_chunk(data: &str) -> Result<Option<String>, OracleError> {
    let chunk: Value = serde_json::from_str(data)
        .map_err(|err| OracleError::Stream(format!("{err} | chunk={}", preview_body(data))))?;
    Ok(delta_text(&chunk)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string))
}
