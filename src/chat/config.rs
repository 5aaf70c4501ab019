//! Immutable completion-client configuration resolved once at startup.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, auth::SecretString, error::ConfigError};

/// Default generation length cap.
pub const DEFAULT_MAX_TOKENS: u32 = 512;
/// Default sampling temperature; fixed at construction so output variability comes only
/// from the upstream service, never from client-side parameter drift.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default calls-per-window cap.
pub const DEFAULT_RATE_LIMIT: u32 = 10;
/// Default per-call deadline.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

// Scaffold values that ship in deployment templates; a credential or model equal to one
// of these means the deployment was never configured.
const PLACEHOLDER_VALUES: &[&str] =
	&["changeme", "placeholder", "sk-your-api-key", "your-api-key", "your-model"];

/// Configuration for a [`ChatClient`](crate::chat::ChatClient).
///
/// Resolved once at startup and injected into the client; every recognized option and
/// its effect is enumerated here rather than read ad hoc from the environment.
#[derive(Clone, Debug)]
pub struct ChatConfig {
	/// Credential for upstream authentication.
	pub api_key: SecretString,
	/// Text-generation model identifier.
	pub model: String,
	/// Upstream chat-completions endpoint.
	pub endpoint: Url,
	/// Generation length cap.
	pub max_tokens: u32,
	/// Sampling temperature, fixed for every call.
	pub temperature: f32,
	/// Calls permitted per rate-limit window.
	pub rate_limit: u32,
	/// Per-call deadline; the in-flight call is cancelled when it elapses.
	pub timeout: StdDuration,
}
impl ChatConfig {
	/// Creates a configuration with default token cap, temperature, rate limit, and
	/// deadline.
	pub fn new(api_key: SecretString, model: impl Into<String>, endpoint: Url) -> Self {
		Self {
			api_key,
			model: model.into(),
			endpoint,
			max_tokens: DEFAULT_MAX_TOKENS,
			temperature: DEFAULT_TEMPERATURE,
			rate_limit: DEFAULT_RATE_LIMIT,
			timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Overrides the generation length cap.
	pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
		self.max_tokens = max_tokens;

		self
	}

	/// Overrides the calls-per-window cap.
	pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
		self.rate_limit = rate_limit;

		self
	}

	/// Overrides the per-call deadline.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Ensures the credential and model identifier are present and non-placeholder.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if is_placeholder(self.api_key.expose()) {
			return Err(ConfigError::PlaceholderApiKey);
		}
		if is_placeholder(&self.model) {
			return Err(ConfigError::PlaceholderModel);
		}

		Ok(())
	}
}

fn is_placeholder(value: &str) -> bool {
	let value = value.trim();

	value.is_empty() || PLACEHOLDER_VALUES.contains(&value.to_ascii_lowercase().as_str())
}
