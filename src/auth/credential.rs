//! Bearer credential extraction from inbound requests.
//!
//! The gateway does not depend on any particular HTTP framework; route layers project
//! whatever request type they handle into an [`InboundRequest`] before calling
//! [`authenticate`](crate::gateway::AuthGateway::authenticate).

/// Cookie carrying a locally-issued administrator token.
pub const ADMIN_TOKEN_COOKIE: &str = "admin_token";
/// Cookie carrying a locally-issued session token.
pub const SESSION_TOKEN_COOKIE: &str = "session_token";

/// Credential-bearing view of an inbound HTTP request.
#[derive(Clone, Debug, Default)]
pub struct InboundRequest {
	authorization: Option<String>,
	cookies: Vec<(String, String)>,
}
impl InboundRequest {
	/// Creates an empty request view with no credential material.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches the raw `Authorization` header value.
	pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
		self.authorization = Some(value.into());

		self
	}

	/// Attaches a single cookie pair.
	pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.cookies.push((name.into(), value.into()));

		self
	}

	/// Parses a raw `Cookie` header (`name=value; name=value`) into cookie pairs,
	/// skipping malformed segments.
	pub fn with_cookie_header(mut self, header: &str) -> Self {
		for segment in header.split(';') {
			if let Some((name, value)) = segment.split_once('=') {
				let name = name.trim();
				let value = value.trim();

				if !name.is_empty() && !value.is_empty() {
					self.cookies.push((name.to_owned(), value.to_owned()));
				}
			}
		}

		self
	}

	/// Resolves the effective bearer credential.
	///
	/// The `Authorization` header takes precedence; otherwise the
	/// [`ADMIN_TOKEN_COOKIE`] then [`SESSION_TOKEN_COOKIE`] cookies are consulted.
	/// Returns `None` when no location carries a usable credential.
	pub fn bearer(&self) -> Option<BearerCredential> {
		if let Some(token) = self.authorization.as_deref().and_then(parse_bearer_header) {
			return Some(BearerCredential {
				token: token.to_owned(),
				origin: CredentialOrigin::AuthorizationHeader,
			});
		}

		[
			(ADMIN_TOKEN_COOKIE, CredentialOrigin::AdminCookie),
			(SESSION_TOKEN_COOKIE, CredentialOrigin::SessionCookie),
		]
		.into_iter()
		.find_map(|(name, origin)| {
			self.cookie(name).map(|token| BearerCredential { token: token.to_owned(), origin })
		})
	}

	fn cookie(&self, name: &str) -> Option<&str> {
		self.cookies
			.iter()
			.find(|(cookie, value)| cookie == name && !value.is_empty())
			.map(|(_, value)| value.as_str())
	}
}

/// A bearer credential resolved from one request location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerCredential {
	token: String,
	origin: CredentialOrigin,
}
impl BearerCredential {
	/// Returns the raw token value.
	pub fn token(&self) -> &str {
		&self.token
	}

	/// Returns where in the request the credential was found.
	pub fn origin(&self) -> CredentialOrigin {
		self.origin
	}
}

/// Request location a bearer credential was resolved from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialOrigin {
	/// `Authorization: Bearer <token>` header.
	AuthorizationHeader,
	/// `admin_token` cookie.
	AdminCookie,
	/// `session_token` cookie.
	SessionCookie,
}

fn parse_bearer_header(value: &str) -> Option<&str> {
	let (scheme, rest) = value.trim().split_once(' ')?;

	if !scheme.eq_ignore_ascii_case("Bearer") {
		return None;
	}

	let token = rest.trim();

	(!token.is_empty()).then_some(token)
}
