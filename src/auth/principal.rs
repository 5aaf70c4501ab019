//! Resolved caller identities and the trust domains that produce them.

// self
use crate::{_prelude::*, verify::VerifiedClaims};

/// Trust domain that produced a [`Principal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
	/// Credential signed and verified with the process-wide secret.
	LocalToken,
	/// Credential issued and verified by an external identity provider.
	FederatedToken,
}
impl SourceKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SourceKind::LocalToken => "local_token",
			SourceKind::FederatedToken => "federated_token",
		}
	}
}
impl Display for SourceKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error returned when a principal cannot be constructed from verified claims.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PrincipalError {
	/// The verified claim set carried an empty subject identifier.
	#[error("Principal subject identifier cannot be empty.")]
	EmptySubject,
}

/// The resolved identity of an authenticated caller.
///
/// Constructed fresh per request, never mutated after creation, and discarded when the
/// request completes. A principal always has a non-empty [`id`](Principal::id) and
/// exactly one [`source`](Principal::source); `role` is only populated for locally-issued
/// tokens and `claims` only for federated ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
	/// Opaque subject identifier.
	pub id: String,
	/// Optional contact address.
	pub email: Option<String>,
	/// Optional authorization role; present only when `source` is
	/// [`SourceKind::LocalToken`]. Role checks are the caller's responsibility.
	pub role: Option<String>,
	/// Trust domain that produced this principal.
	pub source: SourceKind,
	/// Raw claim set from a federated token, opaque to the gateway; present only when
	/// `source` is [`SourceKind::FederatedToken`].
	pub claims: Option<serde_json::Value>,
}
impl Principal {
	/// Builds a principal from a verifier's claim set, gating `role` and `claims` by the
	/// producing trust domain.
	pub fn from_claims(
		source: SourceKind,
		verified: VerifiedClaims,
	) -> Result<Self, PrincipalError> {
		if verified.subject.is_empty() {
			return Err(PrincipalError::EmptySubject);
		}

		let (role, claims) = match source {
			SourceKind::LocalToken => (verified.role, None),
			SourceKind::FederatedToken => (None, verified.payload),
		};

		Ok(Self { id: verified.subject, email: verified.email, role, source, claims })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn claims() -> VerifiedClaims {
		VerifiedClaims {
			subject: "user-1".into(),
			email: Some("user@example.com".into()),
			role: Some("admin".into()),
			payload: Some(serde_json::json!({ "sub": "user-1" })),
		}
	}

	#[test]
	fn empty_subject_is_rejected() {
		let verified = VerifiedClaims { subject: String::new(), ..claims() };

		assert_eq!(
			Principal::from_claims(SourceKind::LocalToken, verified),
			Err(PrincipalError::EmptySubject),
		);
	}

	#[test]
	fn local_principal_keeps_role_and_drops_payload() {
		let principal = Principal::from_claims(SourceKind::LocalToken, claims())
			.expect("Local principal should build from a non-empty subject.");

		assert_eq!(principal.role.as_deref(), Some("admin"));
		assert_eq!(principal.claims, None);
		assert_eq!(principal.source, SourceKind::LocalToken);
	}

	#[test]
	fn federated_principal_keeps_payload_and_drops_role() {
		let principal = Principal::from_claims(SourceKind::FederatedToken, claims())
			.expect("Federated principal should build from a non-empty subject.");

		assert_eq!(principal.role, None);
		assert_eq!(principal.claims, Some(serde_json::json!({ "sub": "user-1" })));
		assert_eq!(principal.source, SourceKind::FederatedToken);
	}
}
