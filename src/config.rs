use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::FailureReason;

/// Number of attempts a generation call may make, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct MaxAttempts(u32);

impl MaxAttempts {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 5;
    pub const DEFAULT: u32 = 3;

    /// Clamps `n` into the allowed range.
    pub fn clamped(n: u32) -> Self {
        Self(n.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for MaxAttempts {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

// Settings files: anything outside the range falls back to the default
// instead of being clamped.
impl From<i64> for MaxAttempts {
    fn from(value: i64) -> Self {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Self(value as u32)
        } else {
            Self::default()
        }
    }
}

impl From<MaxAttempts> for u32 {
    fn from(value: MaxAttempts) -> Self {
        value.0
    }
}

/// Two-valued switch stored as "yes"/"no" in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Toggle {
    Yes,
    #[default]
    No,
}

impl Toggle {
    pub fn is_enabled(self) -> bool {
        self == Toggle::Yes
    }
}

impl From<String> for Toggle {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("yes") {
            Toggle::Yes
        } else {
            Toggle::No
        }
    }
}

impl From<Toggle> for String {
    fn from(value: Toggle) -> Self {
        match value {
            Toggle::Yes => "yes".to_string(),
            Toggle::No => "no".to_string(),
        }
    }
}

/// Everything one generation call needs, resolved by the host.
#[derive(Clone)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub credential: String,
    pub model: String,
    pub prompt: Option<String>,
    pub max_retries: MaxAttempts,
    pub request_timeout: Duration,
}

impl GenerationConfig {
    pub fn new(
        endpoint: impl Into<String>,
        credential: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: credential.into(),
            model: model.into(),
            prompt: None,
            max_retries: MaxAttempts::default(),
            request_timeout: Duration::from_secs(default_request_timeout()),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: MaxAttempts) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Endpoint, credential and model must all be present, and the
    /// credential must be usable in an `Authorization` header.
    pub fn validate(&self) -> std::result::Result<(), FailureReason> {
        if self.endpoint.trim().is_empty() {
            return Err(FailureReason::Misconfigured("endpoint"));
        }
        if self.credential.trim().is_empty() || !is_header_safe(&self.credential) {
            return Err(FailureReason::Misconfigured("credential"));
        }
        if self.model.trim().is_empty() {
            return Err(FailureReason::Misconfigured("model"));
        }
        Ok(())
    }

    /// The configured prompt, if it has any content.
    pub fn configured_prompt(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("endpoint", &self.endpoint)
            .field("credential", &"<redacted>")
            .field("model", &self.model)
            .field("prompt", &self.prompt)
            .field("max_retries", &self.max_retries)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub model_name: Option<String>,
    pub prompt: Option<String>,

    #[serde(default)]
    pub max_retries: MaxAttempts,

    #[serde(default)]
    pub update_on_save: Toggle,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_backoff_unit")]
    pub backoff_unit_ms: u64,

    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ai-summary");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("summaries.db").to_string_lossy().to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_backoff_unit() -> u64 {
    1000
}

fn default_bulk_concurrency() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            api_url: None,
            api_token: None,
            model_name: None,
            prompt: None,
            max_retries: MaxAttempts::default(),
            update_on_save: Toggle::No,
            request_timeout_secs: default_request_timeout(),
            backoff_unit_ms: default_backoff_unit(),
            bulk_concurrency: default_bulk_concurrency(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads settings from `path`, writing the defaults there first if it
    /// does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save_to(path)?;
            Ok(settings)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ai-summary")
            .join("config.toml")
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the per-call generation config. Missing or invalid values come
    /// through empty so that generation reports them as misconfigured.
    pub fn generation_config(&self) -> GenerationConfig {
        let endpoint = match self.api_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                if is_http_url(raw) {
                    raw.to_string()
                } else {
                    tracing::warn!("Ignoring api_url {:?}: not an http(s) URL", raw);
                    String::new()
                }
            }
            _ => String::new(),
        };

        GenerationConfig {
            endpoint,
            credential: self.api_token.clone().unwrap_or_default(),
            model: self.model_name.clone().unwrap_or_default(),
            prompt: self.prompt.clone().filter(|p| !p.trim().is_empty()),
            max_retries: self.max_retries,
            request_timeout: self.request_timeout(),
        }
    }
}

fn is_header_safe(credential: &str) -> bool {
    HeaderValue::from_str(&format!("Bearer {}", credential)).is_ok()
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}
