//! Credential verification strategy contracts.
//!
//! The gateway treats verification as an ordered chain of [`TokenVerifier`] strategies,
//! each mapping a raw bearer token to a uniform [`VerifiedClaims`] value or an internal
//! [`VerifyError`]. Rejection reasons never cross the gateway boundary; they exist so
//! operators can log them and so the chain knows to fall through to the next strategy.

pub mod local;
#[cfg(feature = "reqwest")] pub mod federated;

pub use local::*;
#[cfg(feature = "reqwest")] pub use federated::*;

// self
use crate::{_prelude::*, auth::SourceKind, error::BoxError};

/// Boxed future returned by [`TokenVerifier::verify`].
pub type VerifyFuture<'a> =
	Pin<Box<dyn Future<Output = Result<VerifiedClaims, VerifyError>> + 'a + Send>>;

/// Strategy that validates one class of bearer credential.
///
/// Implementations must be cheap to call with garbage input: every inbound credential is
/// offered to each strategy in turn until one accepts it.
pub trait TokenVerifier
where
	Self: Send + Sync,
{
	/// Trust domain this strategy vouches for.
	fn source_kind(&self) -> SourceKind;

	/// Validates the token, returning its claims on success.
	fn verify<'a>(&'a self, token: &'a str) -> VerifyFuture<'a>;
}

/// Uniform claim set produced by every verification strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedClaims {
	/// Subject identifier the token was issued to.
	pub subject: String,
	/// Contact address, when the token carries one.
	pub email: Option<String>,
	/// Authorization role, when the token carries one (locally-issued tokens only).
	pub role: Option<String>,
	/// Full decoded payload, when the strategy preserves it (federated tokens only).
	pub payload: Option<serde_json::Value>,
}

/// Internal verification failure taxonomy.
///
/// These values trigger fall-through to the next strategy in the chain and are suitable
/// for operator logs; they are never surfaced to end users.
#[derive(Debug, ThisError)]
pub enum VerifyError {
	/// Token is structurally invalid or carries unusable claims.
	#[error("Token is malformed.")]
	Malformed {
		/// Underlying decoding failure.
		#[source]
		source: BoxError,
	},
	/// Token signature does not match the verification key.
	#[error("Token signature is invalid.")]
	BadSignature,
	/// Token expiry lies in the past.
	#[error("Token has expired.")]
	Expired,
	/// Token header names no key identifier to select a verification key with.
	#[error("Token header is missing a key identifier.")]
	MissingKeyId,
	/// Key set does not contain the key the token was signed with.
	#[error("Verification key set has no key `{kid}`.")]
	UnknownKey {
		/// Key identifier named by the token header.
		kid: String,
	},
	/// Token uses an algorithm the strategy does not accept.
	#[error("Token algorithm {algorithm} is not supported.")]
	UnsupportedAlgorithm {
		/// Algorithm label from the token header.
		algorithm: String,
	},
	/// Verification key material could not be fetched.
	#[error("Verification key set could not be fetched.")]
	KeyFetch {
		/// Underlying transport or decoding failure.
		#[source]
		source: BoxError,
	},
}
impl VerifyError {
	/// Wraps a structural decoding failure.
	pub fn malformed(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Malformed { source: Box::new(src) }
	}

	/// Wraps a key-set fetch failure.
	pub fn key_fetch(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::KeyFetch { source: Box::new(src) }
	}
}

pub(crate) fn classify_jwt_error(error: jsonwebtoken::errors::Error) -> VerifyError {
	use jsonwebtoken::errors::ErrorKind;

	match error.kind() {
		ErrorKind::ExpiredSignature => VerifyError::Expired,
		ErrorKind::InvalidSignature => VerifyError::BadSignature,
		_ => VerifyError::malformed(error),
	}
}
