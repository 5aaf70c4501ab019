//! Federated identity-token verification against a provider's JWKS endpoint.
//!
//! Key material is fetched over HTTPS and cached with a TTL. The read path takes a
//! short [`RwLock`] read; refreshes are serialized behind an [`AsyncMutex`] so
//! concurrent cache misses trigger a single fetch, and no lock is held across the
//! network await.

// std
use std::time::{Duration as StdDuration, Instant};
// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
// self
use crate::{
	_prelude::*,
	auth::SourceKind,
	error::ConfigError,
	verify::{TokenVerifier, VerifiedClaims, VerifyError, VerifyFuture, classify_jwt_error},
};

/// Default TTL for cached JWKS documents.
pub const DEFAULT_JWKS_CACHE_TTL: StdDuration = StdDuration::from_secs(300);
/// Default deadline for a single JWKS fetch.
pub const DEFAULT_JWKS_FETCH_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Configuration for a [`FederatedTokenVerifier`], resolved once at startup.
#[derive(Clone, Debug)]
pub struct FederatedConfig {
	/// JWKS document URL of the identity provider.
	pub jwks_url: Url,
	/// Expected `iss` claim; unchecked when `None`.
	pub issuer: Option<String>,
	/// Expected `aud` claim; unchecked when `None`.
	pub audience: Option<String>,
	/// How long a fetched key set stays fresh.
	pub cache_ttl: StdDuration,
	/// Deadline applied to each key-set fetch; the in-flight request is cancelled and
	/// its connection released when the deadline elapses.
	pub fetch_timeout: StdDuration,
}
impl FederatedConfig {
	/// Creates a configuration with default cache TTL and fetch deadline.
	pub fn new(jwks_url: Url) -> Self {
		Self {
			jwks_url,
			issuer: None,
			audience: None,
			cache_ttl: DEFAULT_JWKS_CACHE_TTL,
			fetch_timeout: DEFAULT_JWKS_FETCH_TIMEOUT,
		}
	}

	/// Requires the given `iss` claim.
	pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
		self.issuer = Some(issuer.into());

		self
	}

	/// Requires the given `aud` claim.
	pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = Some(audience.into());

		self
	}
}

#[derive(Clone)]
struct CachedKey {
	key: DecodingKey,
	algorithm: Algorithm,
}

struct KeySetCache {
	keys: Vec<(String, CachedKey)>,
	fetched_at: Instant,
}
impl KeySetCache {
	fn stale(&self, ttl: StdDuration) -> bool {
		self.fetched_at.elapsed() > ttl
	}

	fn get(&self, kid: &str) -> Option<CachedKey> {
		self.keys.iter().find(|(id, _)| id == kid).map(|(_, key)| key.clone())
	}
}

#[derive(Deserialize)]
struct JwksDocument {
	keys: Vec<Jwk>,
}

#[derive(Deserialize)]
struct Jwk {
	kid: String,
	kty: String,
	n: Option<String>,
	e: Option<String>,
	x: Option<String>,
	y: Option<String>,
	crv: Option<String>,
}

/// Verifies RS256/ES256 tokens issued by an external identity provider.
pub struct FederatedTokenVerifier {
	config: FederatedConfig,
	client: ReqwestClient,
	cache: RwLock<Option<KeySetCache>>,
	refresh_guard: AsyncMutex<()>,
}
impl FederatedTokenVerifier {
	/// Creates a verifier with its own HTTP client.
	pub fn new(config: FederatedConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Ok(Self::with_client(config, client))
	}

	/// Creates a verifier that reuses a caller-provided HTTP client.
	pub fn with_client(config: FederatedConfig, client: ReqwestClient) -> Self {
		Self { config, client, cache: RwLock::new(None), refresh_guard: AsyncMutex::new(()) }
	}

	fn cached_key(&self, kid: &str) -> Option<CachedKey> {
		self.cache
			.read()
			.as_ref()
			.filter(|cache| !cache.stale(self.config.cache_ttl))
			.and_then(|cache| cache.get(kid))
	}

	async fn decoding_key(&self, kid: &str) -> Result<CachedKey, VerifyError> {
		if let Some(key) = self.cached_key(kid) {
			return Ok(key);
		}

		let _refresh = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited for the guard.
		if let Some(key) = self.cached_key(kid) {
			return Ok(key);
		}

		let refreshed = self.fetch_key_set().await?;
		let key = refreshed.get(kid);

		*self.cache.write() = Some(refreshed);

		key.ok_or_else(|| VerifyError::UnknownKey { kid: kid.to_owned() })
	}

	async fn fetch_key_set(&self) -> Result<KeySetCache, VerifyError> {
		let response = self
			.client
			.get(self.config.jwks_url.clone())
			.timeout(self.config.fetch_timeout)
			.send()
			.await
			.map_err(VerifyError::key_fetch)?
			.error_for_status()
			.map_err(VerifyError::key_fetch)?;
		let document: JwksDocument =
			response.json().await.map_err(VerifyError::key_fetch)?;
		let mut keys = Vec::with_capacity(document.keys.len());

		for jwk in document.keys {
			if let Some(key) = decode_jwk(&jwk)? {
				keys.push((jwk.kid, key));
			}
		}

		Ok(KeySetCache { keys, fetched_at: Instant::now() })
	}

	fn validation(&self, algorithm: Algorithm) -> Validation {
		let mut validation = Validation::new(algorithm);

		validation.validate_aud = self.config.audience.is_some();

		if let Some(issuer) = &self.config.issuer {
			validation.set_issuer(&[issuer]);
		}
		if let Some(audience) = &self.config.audience {
			validation.set_audience(&[audience]);
		}

		validation
	}
}
impl TokenVerifier for FederatedTokenVerifier {
	fn source_kind(&self) -> SourceKind {
		SourceKind::FederatedToken
	}

	fn verify<'a>(&'a self, token: &'a str) -> VerifyFuture<'a> {
		Box::pin(async move {
			let header = jsonwebtoken::decode_header(token).map_err(classify_jwt_error)?;
			let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;
			let cached = self.decoding_key(&kid).await?;
			let algorithm = select_algorithm(header.alg, cached.algorithm)?;
			let data = jsonwebtoken::decode::<serde_json::Value>(
				token,
				&cached.key,
				&self.validation(algorithm),
			)
			.map_err(classify_jwt_error)?;
			let payload = data.claims;
			let subject =
				payload.get("sub").and_then(serde_json::Value::as_str).unwrap_or_default().to_owned();
			let email = payload
				.get("email")
				.and_then(serde_json::Value::as_str)
				.map(str::to_owned);

			Ok(VerifiedClaims { subject, email, role: None, payload: Some(payload) })
		})
	}
}
impl Debug for FederatedTokenVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FederatedTokenVerifier").field("config", &self.config).finish_non_exhaustive()
	}
}

fn decode_jwk(jwk: &Jwk) -> Result<Option<CachedKey>, VerifyError> {
	match jwk.kty.as_str() {
		"RSA" => {
			let (Some(n), Some(e)) = (&jwk.n, &jwk.e) else {
				return Ok(None);
			};
			let key = DecodingKey::from_rsa_components(n, e).map_err(VerifyError::malformed)?;

			Ok(Some(CachedKey { key, algorithm: Algorithm::RS256 }))
		},
		"EC" => {
			if jwk.crv.as_deref() != Some("P-256") {
				return Ok(None);
			}

			let (Some(x), Some(y)) = (&jwk.x, &jwk.y) else {
				return Ok(None);
			};
			let key = DecodingKey::from_ec_components(x, y).map_err(VerifyError::malformed)?;

			Ok(Some(CachedKey { key, algorithm: Algorithm::ES256 }))
		},
		// Unsupported key types are skipped rather than failing the whole set.
		_ => Ok(None),
	}
}

fn select_algorithm(header: Algorithm, key: Algorithm) -> Result<Algorithm, VerifyError> {
	match header {
		Algorithm::RS256 | Algorithm::ES256 if header == key => Ok(header),
		_ => Err(VerifyError::UnsupportedAlgorithm { algorithm: format!("{header:?}") }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn algorithm_selection_requires_header_key_agreement() {
		assert!(select_algorithm(Algorithm::RS256, Algorithm::RS256).is_ok());
		assert!(select_algorithm(Algorithm::ES256, Algorithm::ES256).is_ok());
		assert!(matches!(
			select_algorithm(Algorithm::RS256, Algorithm::ES256),
			Err(VerifyError::UnsupportedAlgorithm { .. }),
		));
		assert!(matches!(
			select_algorithm(Algorithm::HS256, Algorithm::RS256),
			Err(VerifyError::UnsupportedAlgorithm { .. }),
		));
	}

	#[test]
	fn unsupported_key_types_are_skipped() {
		let jwk = Jwk {
			kid: "oct-1".into(),
			kty: "oct".into(),
			n: None,
			e: None,
			x: None,
			y: None,
			crv: None,
		};

		assert!(decode_jwk(&jwk).expect("Unsupported key type should not error.").is_none());
	}
}
