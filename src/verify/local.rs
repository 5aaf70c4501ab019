//! Locally-issued token verification with the process-wide signing secret.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
// self
use crate::{
	_prelude::*,
	auth::{SecretString, SourceKind},
	verify::{TokenVerifier, VerifiedClaims, VerifyError, VerifyFuture, classify_jwt_error},
};

#[derive(Deserialize)]
struct LocalClaims {
	sub: String,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	role: Option<String>,
}

/// Verifies HS256 tokens signed with a secret controlled by this system.
///
/// Verification is purely local: signature and expiry checks, no network round-trip.
pub struct LocalTokenVerifier {
	decoding_key: DecodingKey,
	validation: Validation,
}
impl LocalTokenVerifier {
	/// Creates a verifier bound to the process-wide signing secret.
	pub fn new(secret: &SecretString) -> Self {
		let decoding_key = DecodingKey::from_secret(secret.expose().as_bytes());
		let mut validation = Validation::new(Algorithm::HS256);

		// Locally-issued tokens carry no audience claim.
		validation.validate_aud = false;

		Self { decoding_key, validation }
	}
}
impl TokenVerifier for LocalTokenVerifier {
	fn source_kind(&self) -> SourceKind {
		SourceKind::LocalToken
	}

	fn verify<'a>(&'a self, token: &'a str) -> VerifyFuture<'a> {
		Box::pin(async move {
			let data = jsonwebtoken::decode::<LocalClaims>(
				token,
				&self.decoding_key,
				&self.validation,
			)
			.map_err(classify_jwt_error)?;
			let LocalClaims { sub, email, role } = data.claims;

			Ok(VerifiedClaims { subject: sub, email, role, payload: None })
		})
	}
}
impl Debug for LocalTokenVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LocalTokenVerifier").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use jsonwebtoken::{EncodingKey, Header};
	// self
	use super::*;

	const SECRET: &str = "unit-test-signing-secret";

	#[derive(Serialize)]
	struct IssuedClaims<'a> {
		sub: &'a str,
		role: Option<&'a str>,
		exp: i64,
	}

	fn issue(sub: &str, role: Option<&str>, ttl_secs: i64) -> String {
		let exp = (OffsetDateTime::now_utc() + Duration::seconds(ttl_secs)).unix_timestamp();

		jsonwebtoken::encode(
			&Header::new(Algorithm::HS256),
			&IssuedClaims { sub, role, exp },
			&EncodingKey::from_secret(SECRET.as_bytes()),
		)
		.expect("Test token should encode successfully.")
	}

	fn verifier() -> LocalTokenVerifier {
		LocalTokenVerifier::new(&SecretString::new(SECRET))
	}

	#[tokio::test]
	async fn valid_token_yields_claims() {
		let claims = verifier()
			.verify(&issue("user-7", Some("admin"), 600))
			.await
			.expect("Freshly signed token should verify.");

		assert_eq!(claims.subject, "user-7");
		assert_eq!(claims.role.as_deref(), Some("admin"));
		assert_eq!(claims.payload, None);
	}

	#[tokio::test]
	async fn expired_token_is_rejected() {
		let err = verifier()
			.verify(&issue("user-7", None, -600))
			.await
			.expect_err("Expired token must be rejected.");

		assert!(matches!(err, VerifyError::Expired));
	}

	#[tokio::test]
	async fn wrong_secret_is_rejected() {
		let foreign = LocalTokenVerifier::new(&SecretString::new("some-other-secret"));
		let err = foreign
			.verify(&issue("user-7", None, 600))
			.await
			.expect_err("Token signed with another secret must be rejected.");

		assert!(matches!(err, VerifyError::BadSignature));
	}

	#[tokio::test]
	async fn garbage_token_is_malformed() {
		let err = verifier()
			.verify("not-a-jwt")
			.await
			.expect_err("Garbage input must be rejected.");

		assert!(matches!(err, VerifyError::Malformed { .. }));
	}
}
