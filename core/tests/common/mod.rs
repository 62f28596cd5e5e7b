#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};

use planweave_core::api::{
    CompletionRequest, FnOperation, Operation, OperationRegistry, Oracle, OracleError, TokenStream,
};

/// Oracle that replays canned completions in order and remembers every
/// prompt it was given. Streaming splits each completion into fixed-size
/// chunks.
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    chunk_chars: usize,
}

impl ScriptedOracle {
    pub fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::chunked(responses, 1)
    }

    pub fn chunked<I, S>(responses: I, chunk_chars: usize) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            chunk_chars: chunk_chars.max(1),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_response(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| OracleError::Request("script exhausted".into()))
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        self.next_response(request)
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<TokenStream, OracleError> {
        let text = self.next_response(request)?;
        Ok(stream::iter(chunks(&text, self.chunk_chars).into_iter().map(Ok)).boxed())
    }
}

/// Split on char boundaries into pieces of `n` chars.
pub fn chunks(text: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(n.max(1)).map(|c| c.iter().collect()).collect()
}

/// Start/end instants of every invocation, keyed by the first argument.
#[derive(Clone, Default)]
pub struct CallLog {
    inner: Arc<Mutex<Vec<CallEntry>>>,
}

#[derive(Debug, Clone)]
pub struct CallEntry {
    pub op: String,
    pub args: Vec<Value>,
    pub started: Instant,
    pub finished: Instant,
}

impl CallLog {
    pub fn entries(&self) -> Vec<CallEntry> {
        self.inner.lock().unwrap().clone()
    }

    pub fn find(&self, first_arg: &str) -> Option<CallEntry> {
        self.entries()
            .into_iter()
            .find(|e| e.args.first().and_then(Value::as_str) == Some(first_arg))
    }
}

/// Operation that sleeps, logs the call, and echoes its first argument.
pub fn recording_op(name: &str, delay: Duration, log: &CallLog) -> Arc<dyn Operation> {
    let log = log.clone();
    let op_name = name.to_string();
    Arc::new(FnOperation::new(name, format!("{name}(query: str) -> str"), move |args| {
        let log = log.clone();
        let op_name = op_name.clone();
        async move {
            let started = Instant::now();
            tokio::time::sleep(delay).await;
            let result = args.first().cloned().unwrap_or(Value::Null);
            log.inner.lock().unwrap().push(CallEntry {
                op: op_name,
                args,
                started,
                finished: Instant::now(),
            });
            Ok(result)
        }
    }))
}

/// `search` and `lookup` echo operations, plus `fail` which always errors.
pub fn test_registry(log: &CallLog) -> Arc<OperationRegistry> {
    let fail: Arc<dyn Operation> = Arc::new(FnOperation::new("fail", "fail() -> never", |_| async {
        anyhow::bail!("service unavailable")
    }));
    let slow: Arc<dyn Operation> = Arc::new(FnOperation::new("slow", "slow() -> str", |_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(json!("late"))
    }));
    Arc::new(
        OperationRegistry::new(vec![
            recording_op("search", Duration::from_millis(50), log),
            recording_op("lookup", Duration::from_millis(10), log),
            fail,
            slow,
        ])
        .unwrap(),
    )
}
