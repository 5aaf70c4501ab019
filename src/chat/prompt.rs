//! Deterministic prompt assembly for the completion client.

// self
use crate::chat::wire::{ChatMessage, SYSTEM_ROLE, USER_ROLE};

/// Conversational context supplied by the caller for one exchange.
///
/// Carries the system instructions (and any grounding notes appended by the route
/// layer); prompt-template selection by user intent is the caller's business logic.
#[derive(Clone, Debug)]
pub struct PromptContext {
	system: String,
}
impl PromptContext {
	/// Creates a context from the base system instructions.
	pub fn new(system: impl Into<String>) -> Self {
		Self { system: system.into() }
	}

	/// Appends a grounding note as a separate paragraph of the system instructions.
	pub fn with_note(mut self, note: impl AsRef<str>) -> Self {
		self.system.push_str("\n\n");
		self.system.push_str(note.as_ref());

		self
	}

	/// Returns the assembled system instructions.
	pub fn system(&self) -> &str {
		&self.system
	}
}

/// Builds the fixed two-message exchange: system instructions, then the user message.
pub(crate) fn build_messages(context: &PromptContext, user_message: &str) -> Vec<ChatMessage> {
	vec![
		ChatMessage { role: SYSTEM_ROLE.into(), content: context.system().into() },
		ChatMessage { role: USER_ROLE.into(), content: user_message.into() },
	]
}
