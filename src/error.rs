//! Gateway-level error types shared across authentication and completion paths.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical gateway error exposed by public constructors and guards.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Authentication outcome surfaced by the gateway guard.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Authentication failure surfaced to route handlers.
///
/// Deliberately coarse: [`AuthError::InvalidCredential`] carries no indication of which
/// verification strategy rejected the credential, so callers cannot be used as a
/// verifier oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum AuthError {
	/// Neither the `Authorization` header nor a recognized cookie carried a credential.
	#[error("Request carries no bearer credential.")]
	MissingCredential,
	/// Every verification strategy rejected the credential.
	#[error("Bearer credential was rejected.")]
	InvalidCredential,
}

/// Configuration and validation failures raised at construction or call time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Completion credential is absent or still a scaffold placeholder.
	#[error("Completion API credential is missing or a placeholder.")]
	PlaceholderApiKey,
	/// Completion model identifier is absent or still a scaffold placeholder.
	#[error("Completion model identifier is missing or a placeholder.")]
	PlaceholderModel,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
