//! Rust’s drop-in edge gateway—hybrid bearer authentication plus a rate-limited
//! assistant-completion client in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod chat;
pub mod error;
pub mod gateway;
pub mod obs;
pub mod verify;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience fixtures and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use jsonwebtoken::{Algorithm, EncodingKey, Header};
	// self
	use crate::{
		auth::SecretString,
		chat::{ChatClient, ChatConfig},
	};

	/// HS256 secret shared by locally-issued test tokens.
	pub const TEST_SIGNING_SECRET: &str = "assist-gateway-test-signing-secret";

	#[derive(Serialize)]
	struct TestClaims<'a> {
		sub: &'a str,
		#[serde(skip_serializing_if = "Option::is_none")]
		email: Option<&'a str>,
		#[serde(skip_serializing_if = "Option::is_none")]
		role: Option<&'a str>,
		exp: i64,
	}

	/// Returns the signing secret used by locally-issued test tokens.
	pub fn test_signing_secret() -> SecretString {
		SecretString::new(TEST_SIGNING_SECRET)
	}

	/// Issues an HS256 token signed with [`TEST_SIGNING_SECRET`].
	///
	/// A negative `ttl_secs` produces an already-expired token.
	pub fn issue_local_token(
		subject: &str,
		email: Option<&str>,
		role: Option<&str>,
		ttl_secs: i64,
	) -> String {
		let exp = (OffsetDateTime::now_utc() + Duration::seconds(ttl_secs)).unix_timestamp();
		let claims = TestClaims { sub: subject, email, role, exp };

		jsonwebtoken::encode(
			&Header::new(Algorithm::HS256),
			&claims,
			&EncodingKey::from_secret(TEST_SIGNING_SECRET.as_bytes()),
		)
		.expect("Test token should encode successfully.")
	}

	/// Builds a completion-client configuration pointed at a mock upstream endpoint.
	pub fn test_chat_config(endpoint: Url) -> ChatConfig {
		let mut config = ChatConfig::new(SecretString::new("test-api-key"), "test-model", endpoint);

		config.timeout = std::time::Duration::from_secs(2);

		config
	}

	/// Constructs a [`ChatClient`] backed by the provided configuration.
	pub fn build_test_chat_client(config: ChatConfig) -> ChatClient {
		ChatClient::new(config).expect("Test chat client should build successfully.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {assist_gateway as _, color_eyre as _, httpmock as _, tokio as _};
