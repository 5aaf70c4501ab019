//! Wire types for the upstream chat-completions JSON exchange.

// self
use crate::_prelude::*;

/// Role label for system instructions.
pub const SYSTEM_ROLE: &str = "system";
/// Role label for end-user messages.
pub const USER_ROLE: &str = "user";

/// One message of the outbound exchange.
#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
	/// Speaker role (`system` or `user`).
	pub role: String,
	/// Message text.
	pub content: String,
}

/// Request body sent to the upstream completion endpoint.
///
/// Sampling penalties are hard zeros so output variability comes only from the upstream
/// service.
#[derive(Clone, Debug, Serialize)]
pub struct CompletionRequest {
	/// Model identifier.
	pub model: String,
	/// Fixed two-message exchange.
	pub messages: Vec<ChatMessage>,
	/// Generation length cap.
	pub max_tokens: u32,
	/// Fixed sampling temperature.
	pub temperature: f32,
	/// Always zero.
	pub presence_penalty: f32,
	/// Always zero.
	pub frequency_penalty: f32,
}

/// Response body returned by the upstream completion endpoint.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
	/// Generated choices; a well-formed response carries at least one.
	#[serde(default)]
	pub choices: Vec<Choice>,
	/// Token usage accounting, when provided.
	#[serde(default)]
	pub usage: Option<UsageStats>,
	/// Model that actually served the request, when provided.
	#[serde(default)]
	pub model: Option<String>,
}

/// One generated choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
	/// Generated message.
	pub message: ChoiceMessage,
}

/// Message content of a generated choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
	/// Generated text; may be empty on degenerate responses.
	#[serde(default)]
	pub content: String,
}

/// Token usage accounting reported by the upstream service.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct UsageStats {
	/// Tokens consumed by the prompt.
	#[serde(default)]
	pub prompt_tokens: u32,
	/// Tokens generated for the completion.
	#[serde(default)]
	pub completion_tokens: u32,
	/// Total tokens billed.
	#[serde(default)]
	pub total_tokens: u32,
}

/// Parses a response body, reporting the JSON path of any structural mismatch.
pub(crate) fn parse_response(
	bytes: &[u8],
) -> Result<CompletionResponse, serde_path_to_error::Error<serde_json::Error>> {
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
}
