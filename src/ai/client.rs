//! Bounded retry loop around a single generation request.
//!
//! Attempts run strictly one after another. Transport failures, 429 and 5xx
//! responses are retried after an exponential backoff of `unit * 2^(a-1)`
//! (1, 2, 4, 8 units); every other outcome ends the call immediately. No
//! delay follows the final attempt.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::MaxAttempts;
use crate::models::{FailureReason, GenerationOutcome};

use super::composer::ChatRequest;
use super::transport::{Sleeper, Transport};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pulls `choices[0].message.content` out of a response body.
pub fn extract_summary(body: &str) -> Option<String> {
    let response: ChatResponse = serde_json::from_str(body).ok()?;
    let content = response.choices.into_iter().next()?.message?.content?;
    let content = content.trim();
    (!content.is_empty()).then(|| content.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Success,
    Retryable,
    Terminal,
}

fn classify(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        429 | 500..=599 => StatusClass::Retryable,
        _ => StatusClass::Terminal,
    }
}

pub struct RetryingClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    backoff_unit: Duration,
}

impl RetryingClient {
    pub fn new(transport: Arc<dyn Transport>, sleeper: Arc<dyn Sleeper>, backoff_unit: Duration) -> Self {
        Self {
            transport,
            sleeper,
            backoff_unit,
        }
    }

    /// Delay applied after failed attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit * 2u32.pow(attempt.saturating_sub(1))
    }

    pub async fn send(
        &self,
        payload: &ChatRequest,
        credential: &str,
        endpoint: &str,
        max_attempts: MaxAttempts,
        timeout: Duration,
    ) -> GenerationOutcome {
        let max_attempts = max_attempts.get();
        let mut last_failure = FailureReason::TransportFailure("no attempt made".to_string());

        for attempt in 1..=max_attempts {
            tracing::debug!("Generation attempt {}/{} to {}", attempt, max_attempts, endpoint);

            match self
                .transport
                .post_json(endpoint, credential, payload, timeout)
                .await
            {
                Err(e) => {
                    tracing::warn!("Attempt {}/{} failed: {}", attempt, max_attempts, e);
                    last_failure = FailureReason::TransportFailure(e.to_string());
                }
                Ok(reply) => match classify(reply.status) {
                    StatusClass::Success => {
                        return match extract_summary(&reply.body) {
                            Some(summary) => GenerationOutcome::Success(summary),
                            None => {
                                tracing::warn!(
                                    "Attempt {}/{} returned {} without summary text",
                                    attempt,
                                    max_attempts,
                                    reply.status
                                );
                                GenerationOutcome::Failure(FailureReason::EmptyResponse)
                            }
                        };
                    }
                    StatusClass::Retryable => {
                        tracing::warn!(
                            "Attempt {}/{} got status {}",
                            attempt,
                            max_attempts,
                            reply.status
                        );
                        last_failure = FailureReason::RateLimitedOrServerError(reply.status);
                    }
                    StatusClass::Terminal => {
                        tracing::warn!("Generation rejected with status {}", reply.status);
                        return GenerationOutcome::Failure(FailureReason::ClientError(reply.status));
                    }
                },
            }

            if attempt < max_attempts {
                let delay = self.backoff_delay(attempt);
                tracing::debug!("Backing off for {:?}", delay);
                self.sleeper.sleep(delay).await;
            }
        }

        GenerationOutcome::Failure(last_failure)
    }
}
