use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::composer::ChatRequest;
use super::transport::{HttpReply, Sleeper, Transport, TransportError};

pub(crate) type Step = Result<HttpReply, TransportError>;

pub(crate) fn ok_reply(summary: &str) -> Step {
    Ok(HttpReply {
        status: 200,
        body: serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": summary } }]
        })
        .to_string(),
    })
}

pub(crate) fn status(code: u16) -> Step {
    Ok(HttpReply {
        status: code,
        body: String::new(),
    })
}

pub(crate) fn timeout() -> Step {
    Err(TransportError::Timeout)
}

/// Replays a fixed script of replies, then repeats `fallback` forever.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Step>) -> Self {
        Self::with_fallback(script, timeout())
    }

    pub(crate) fn with_fallback(script: Vec<Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always(step: Step) -> Self {
        Self::with_fallback(Vec::new(), step)
    }

    pub(crate) fn attempts(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(
        &self,
        _endpoint: &str,
        _credential: &str,
        payload: &ChatRequest,
        _timeout: Duration,
    ) -> Result<HttpReply, TransportError> {
        self.calls.lock().unwrap().push(payload.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub(crate) fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
