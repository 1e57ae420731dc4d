#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ai_summary::ai::{
    ChatRequest, EngineOptions, HttpReply, RetryingClient, Sleeper, SummaryEngine, Transport,
    TransportError,
};
use ai_summary::app::App;
use ai_summary::db::Repository;
use ai_summary::Settings;
use async_trait::async_trait;

pub fn completion_body(summary: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": summary },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// Answers every request with the same reply and counts calls.
pub struct FixedTransport {
    reply: HttpReply,
    calls: AtomicUsize,
}

impl FixedTransport {
    pub fn ok(summary: &str) -> Self {
        Self {
            reply: HttpReply {
                status: 200,
                body: completion_body(summary),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            reply: HttpReply {
                status,
                body: String::new(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FixedTransport {
    async fn post_json(
        &self,
        _endpoint: &str,
        _credential: &str,
        _payload: &ChatRequest,
        _timeout: Duration,
    ) -> Result<HttpReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

pub fn sample_settings(db_path: &Path) -> Settings {
    Settings {
        db_path: db_path.to_string_lossy().to_string(),
        api_url: Some("https://api.example.com/v1/chat/completions".to_string()),
        api_token: Some("test-token".to_string()),
        model_name: Some("gpt-test".to_string()),
        ..Settings::default()
    }
}

pub async fn app_with_transport(settings: Settings, transport: Arc<FixedTransport>) -> App {
    let repository = Arc::new(Repository::new(&settings.db_path).await.unwrap());
    let client = RetryingClient::new(transport, Arc::new(NoSleep), settings.backoff_unit());
    let engine = SummaryEngine::new(client, repository.clone(), EngineOptions::from(&settings));
    App::from_parts(settings, repository, engine)
}
