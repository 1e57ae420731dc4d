pub mod client;
pub mod composer;
pub mod engine;
pub mod staleness;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::RetryingClient;
pub use composer::{ChatMessage, ChatRequest, Role, DEFAULT_PROMPT};
pub use engine::{EngineOptions, SummaryEngine};
pub use transport::{HttpReply, HttpTransport, Sleeper, TokioSleeper, Transport, TransportError};
