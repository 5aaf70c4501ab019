//! Outbound completion client with config gating, rate limiting, and normalized results.

pub mod config;
pub mod limit;
pub mod prompt;
pub mod wire;

pub use config::*;
pub use limit::*;
pub use prompt::*;
pub use wire::{ChatMessage, CompletionRequest, CompletionResponse, UsageStats};

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")]
use crate::{
	error::ConfigError,
	obs::{self, GatewayOp, OpOutcome, OpSpan},
};

// Upstream error bodies can be arbitrarily large; keep only enough for operator logs.
#[cfg(feature = "reqwest")]
const DETAIL_CAP: usize = 512;

/// Stable failure classification for normalized completion results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureCategory {
	/// Client configuration is missing or still a placeholder; no call was made.
	ConfigurationError,
	/// The process-wide call budget for the current window is exhausted; no call was
	/// made.
	RateLimited,
	/// The per-call deadline elapsed and the in-flight call was cancelled.
	Timeout,
	/// The upstream service responded with a non-success status or was unreachable.
	UpstreamError,
	/// The upstream response carried no usable generated content.
	MalformedResponse,
}
impl FailureCategory {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FailureCategory::ConfigurationError => "configuration_error",
			FailureCategory::RateLimited => "rate_limited",
			FailureCategory::Timeout => "timeout",
			FailureCategory::UpstreamError => "upstream_error",
			FailureCategory::MalformedResponse => "malformed_response",
		}
	}

	/// Returns the fixed user-presentable message for this category.
	///
	/// The mapping is a fixed table: raw upstream error text never reaches an end user.
	pub const fn user_message(self) -> &'static str {
		match self {
			FailureCategory::RateLimited =>
				"You're sending messages too quickly. Please wait a moment and try again.",
			FailureCategory::ConfigurationError =>
				"The assistant is unavailable right now. Please contact support.",
			FailureCategory::Timeout
			| FailureCategory::UpstreamError
			| FailureCategory::MalformedResponse =>
				"The assistant could not respond right now. Please try again later.",
		}
	}
}
impl Display for FailureCategory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Normalized result of one completion exchange.
///
/// Passed by value to the caller and discarded; failures are values here, never raised
/// errors, so no transport-level failure can cross the component boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
	/// The upstream service produced usable content.
	Success {
		/// Generated text, trimmed.
		content: String,
		/// Token usage accounting, when the upstream provided it.
		usage: Option<UsageStats>,
		/// Model that served the request.
		model: String,
		/// Capture timestamp.
		captured_at: OffsetDateTime,
	},
	/// The exchange failed; the caller maps the category to an HTTP status and logs the
	/// detail.
	Failure {
		/// Safe, generic message that may reach an end user.
		user_message: &'static str,
		/// Stable failure classification.
		category: FailureCategory,
		/// Raw underlying cause for operator logs; never user-facing.
		detail: Option<String>,
		/// Capture timestamp.
		captured_at: OffsetDateTime,
	},
}
impl Completion {
	/// Returns `true` for [`Completion::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, Completion::Success { .. })
	}

	fn failure(category: FailureCategory, detail: Option<String>) -> Self {
		Self::Failure {
			user_message: category.user_message(),
			category,
			detail,
			captured_at: OffsetDateTime::now_utc(),
		}
	}
}

/// Rate-limited client for the upstream text-generation service.
///
/// Wraps each call with configuration validation, the injected rate-limit policy, a
/// per-call deadline, and failure normalization. Performs no retries; a failed call
/// returns a [`Completion::Failure`] and retrying is the caller's decision.
#[cfg(feature = "reqwest")]
pub struct ChatClient {
	config: ChatConfig,
	limiter: Arc<dyn RateLimitPolicy>,
	http_client: ReqwestClient,
}
#[cfg(feature = "reqwest")]
impl ChatClient {
	/// Creates a client with its own HTTP transport and a process-wide
	/// [`FixedWindowLimiter`] sized from the configuration.
	pub fn new(config: ChatConfig) -> Result<Self, ConfigError> {
		let limiter: Arc<dyn RateLimitPolicy> =
			Arc::new(FixedWindowLimiter::new(config.rate_limit));
		let http_client = ReqwestClient::builder().build()?;

		Ok(Self::with_parts(config, limiter, http_client))
	}

	/// Creates a client from caller-provided parts, typically to share a limiter across
	/// clients or to inject an alternative budgeting strategy.
	pub fn with_parts(
		config: ChatConfig,
		limiter: impl Into<Arc<dyn RateLimitPolicy>>,
		http_client: ReqwestClient,
	) -> Self {
		Self { config, limiter: limiter.into(), http_client }
	}

	/// Turns a user message plus conversational context into a normalized completion
	/// result.
	///
	/// Never returns a raised error: every failure path converges to a
	/// [`Completion::Failure`] with a stable category and a fixed user-facing message.
	pub async fn generate(&self, user_message: &str, context: &PromptContext) -> Completion {
		const OP: GatewayOp = GatewayOp::Generate;

		let span = OpSpan::new(OP, "generate");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span.instrument(self.generate_inner(user_message, context)).await;

		match &result {
			Completion::Success { .. } => obs::record_op_outcome(OP, OpOutcome::Success),
			Completion::Failure { .. } => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}

	async fn generate_inner(&self, user_message: &str, context: &PromptContext) -> Completion {
		if let Err(error) = self.config.validate() {
			return Completion::failure(
				FailureCategory::ConfigurationError,
				Some(error.to_string()),
			);
		}

		if self.limiter.evaluate(OffsetDateTime::now_utc()).await == RateLimitDecision::Deny {
			return Completion::failure(FailureCategory::RateLimited, None);
		}

		let request = CompletionRequest {
			model: self.config.model.clone(),
			messages: prompt::build_messages(context, user_message),
			max_tokens: self.config.max_tokens,
			temperature: self.config.temperature,
			presence_penalty: 0.,
			frequency_penalty: 0.,
		};
		// The per-request deadline races the exchange; on expiry reqwest cancels the
		// in-flight call and releases its connection.
		let response = match self
			.http_client
			.post(self.config.endpoint.clone())
			.bearer_auth(self.config.api_key.expose())
			.timeout(self.config.timeout)
			.json(&request)
			.send()
			.await
		{
			Ok(response) => response,
			Err(error) => return Completion::failure(classify_transport(&error), Some(error.to_string())),
		};
		let status = response.status();
		let body = match response.bytes().await {
			Ok(body) => body,
			Err(error) => return Completion::failure(classify_transport(&error), Some(error.to_string())),
		};

		if !status.is_success() {
			return Completion::failure(
				FailureCategory::UpstreamError,
				Some(format!(
					"Upstream returned {status}: {}.",
					truncate_detail(&String::from_utf8_lossy(&body)),
				)),
			);
		}

		let parsed = match wire::parse_response(&body) {
			Ok(parsed) => parsed,
			Err(error) =>
				return Completion::failure(FailureCategory::MalformedResponse, Some(error.to_string())),
		};
		let content = parsed
			.choices
			.first()
			.map(|choice| choice.message.content.trim())
			.filter(|content| !content.is_empty());

		match content {
			Some(content) => {
				self.limiter.record(OffsetDateTime::now_utc());

				Completion::Success {
					content: content.to_owned(),
					usage: parsed.usage,
					model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
					captured_at: OffsetDateTime::now_utc(),
				}
			},
			None => Completion::failure(
				FailureCategory::MalformedResponse,
				Some("Upstream response carried no non-empty choice.".into()),
			),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ChatClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ChatClient").field("config", &self.config).finish_non_exhaustive()
	}
}

#[cfg(feature = "reqwest")]
fn classify_transport(error: &ReqwestError) -> FailureCategory {
	if error.is_timeout() { FailureCategory::Timeout } else { FailureCategory::UpstreamError }
}

#[cfg(feature = "reqwest")]
fn truncate_detail(body: &str) -> &str {
	match body.char_indices().nth(DETAIL_CAP) {
		Some((index, _)) => &body[..index],
		None => body,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_message_table_is_fixed() {
		assert_eq!(
			FailureCategory::RateLimited.user_message(),
			"You're sending messages too quickly. Please wait a moment and try again.",
		);
		assert_eq!(
			FailureCategory::ConfigurationError.user_message(),
			"The assistant is unavailable right now. Please contact support.",
		);

		for category in [
			FailureCategory::Timeout,
			FailureCategory::UpstreamError,
			FailureCategory::MalformedResponse,
		] {
			assert_eq!(
				category.user_message(),
				"The assistant could not respond right now. Please try again later.",
			);
		}
	}

	#[test]
	fn failure_constructor_copies_the_table_message() {
		let completion = Completion::failure(FailureCategory::RateLimited, None);
		let Completion::Failure { user_message, category, detail, .. } = completion else {
			panic!("Constructor must build a failure value.");
		};

		assert_eq!(user_message, FailureCategory::RateLimited.user_message());
		assert_eq!(category, FailureCategory::RateLimited);
		assert_eq!(detail, None);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn detail_truncation_respects_char_boundaries() {
		let long = "é".repeat(DETAIL_CAP + 100);

		assert_eq!(truncate_detail(&long).chars().count(), DETAIL_CAP);
		assert_eq!(truncate_detail("short"), "short");
	}
}
