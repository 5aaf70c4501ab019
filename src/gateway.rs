//! Hybrid request-authentication gateway.

// self
use crate::{
	_prelude::*,
	auth::{InboundRequest, Principal, SecretString},
	error::AuthError,
	obs::{self, GatewayOp, OpOutcome, OpSpan},
	verify::{LocalTokenVerifier, TokenVerifier},
};
#[cfg(feature = "reqwest")]
use crate::verify::{FederatedConfig, FederatedTokenVerifier};

/// Resolves inbound bearer credentials into a [`Principal`] by trying an ordered chain
/// of verification strategies.
///
/// The gateway is a reusable guard: route handlers call
/// [`authenticate`](AuthGateway::authenticate) before touching protected records and
/// make their own authorization decisions from the returned principal. It never leaks
/// which strategy accepted or rejected a credential except through
/// [`Principal::source`].
#[derive(Clone)]
pub struct AuthGateway {
	verifiers: Arc<[Arc<dyn TokenVerifier>]>,
}
impl AuthGateway {
	/// Creates a gateway over the given strategies, tried in order.
	pub fn new(verifiers: impl Into<Vec<Arc<dyn TokenVerifier>>>) -> Self {
		Self { verifiers: verifiers.into().into() }
	}

	/// Creates the standard hybrid chain: locally-issued tokens first, then federated
	/// identity tokens.
	#[cfg(feature = "reqwest")]
	pub fn hybrid(signing_secret: &SecretString, federated: FederatedConfig) -> Result<Self> {
		let local: Arc<dyn TokenVerifier> = Arc::new(LocalTokenVerifier::new(signing_secret));
		let federated: Arc<dyn TokenVerifier> = Arc::new(FederatedTokenVerifier::new(federated)?);

		Ok(Self::new([local, federated]))
	}

	/// Creates a chain that accepts only locally-issued tokens.
	pub fn local_only(signing_secret: &SecretString) -> Self {
		let local: Arc<dyn TokenVerifier> = Arc::new(LocalTokenVerifier::new(signing_secret));

		Self::new([local])
	}

	/// Resolves the request's bearer credential into a [`Principal`].
	///
	/// Fails with [`AuthError::MissingCredential`] when no credential is present and
	/// with [`AuthError::InvalidCredential`] when every strategy rejects it. Individual
	/// rejection reasons stay inside the gateway.
	pub async fn authenticate(&self, request: &InboundRequest) -> Result<Principal, AuthError> {
		const OP: GatewayOp = GatewayOp::Authenticate;

		let span = OpSpan::new(OP, "authenticate");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let credential = request.bearer().ok_or(AuthError::MissingCredential)?;

				for verifier in self.verifiers.iter() {
					let Ok(claims) = verifier.verify(credential.token()).await else {
						continue;
					};

					// A degenerate claim set counts as a rejection, not a hard failure.
					if let Ok(principal) = Principal::from_claims(verifier.source_kind(), claims)
					{
						return Ok(principal);
					}
				}

				Err(AuthError::InvalidCredential)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}
}
impl Debug for AuthGateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let chain: Vec<_> =
			self.verifiers.iter().map(|verifier| verifier.source_kind().as_str()).collect();

		f.debug_struct("AuthGateway").field("chain", &chain).finish()
	}
}
