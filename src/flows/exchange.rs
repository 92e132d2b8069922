//! In-process driver enforcing the handshake's linear stage order.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::ProtocolError,
	flows::{AuthorizationSession, AuthorizedCallback, Broker, CallbackParams},
	http::ProviderHttpClient,
};

/// Handshake stages in the order they must be reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
	/// Nothing has been requested yet.
	Unstarted,
	/// Step 1 returned a request token.
	RequestTokenObtained,
	/// The callback delivered a verifier for the issued token.
	Authorized,
	/// Step 3 returned an access token; the exchange is finished.
	AccessTokenObtained,
}
impl FlowStage {
	/// Returns a stable label suitable for messages and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Unstarted => "unstarted",
			FlowStage::RequestTokenObtained => "request_token_obtained",
			FlowStage::Authorized => "authorized",
			FlowStage::AccessTokenObtained => "access_token_obtained",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug)]
enum ExchangeState {
	Unstarted,
	RequestTokenObtained(AuthorizationSession),
	Authorized(AuthorizedCallback),
	AccessTokenObtained,
}
impl ExchangeState {
	fn stage(&self) -> FlowStage {
		match self {
			ExchangeState::Unstarted => FlowStage::Unstarted,
			ExchangeState::RequestTokenObtained(_) => FlowStage::RequestTokenObtained,
			ExchangeState::Authorized(_) => FlowStage::Authorized,
			ExchangeState::AccessTokenObtained => FlowStage::AccessTokenObtained,
		}
	}
}

/// Drives one handshake through `start`, `authorize`, and `finish`.
///
/// Each step checks the current stage and fails with [`ProtocolError::OutOfOrder`] instead
/// of touching the network when called out of sequence. A failed step leaves the stage
/// unchanged so it can be retried.
#[derive(Debug)]
pub struct TokenExchange<'b, C>
where
	C: ?Sized + ProviderHttpClient,
{
	broker: &'b Broker<C>,
	state: ExchangeState,
}
impl<'b, C> TokenExchange<'b, C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates an unstarted exchange.
	pub fn new(broker: &'b Broker<C>) -> Self {
		Self { broker, state: ExchangeState::Unstarted }
	}

	/// Current stage.
	pub fn stage(&self) -> FlowStage {
		self.state.stage()
	}

	/// Runs step 1 and returns the session to hand to the user agent.
	pub async fn start(&mut self) -> Result<AuthorizationSession> {
		self.expect_stage(FlowStage::Unstarted)?;

		let session = self.broker.request_token().await?;

		self.state = ExchangeState::RequestTokenObtained(session.clone());

		Ok(session)
	}

	/// Accepts the callback for the token issued by [`start`](Self::start).
	///
	/// The callback must name the issued request token, and its carried value must open to
	/// the secret issued in step 1.
	pub fn authorize(&mut self, params: CallbackParams) -> Result<()> {
		let ExchangeState::RequestTokenObtained(session) = &self.state else {
			return Err(self.out_of_order(FlowStage::RequestTokenObtained).into());
		};

		if params.oauth_token != session.request_token.key() {
			return Err(ProtocolError::TokenMismatch.into());
		}

		let secret = self.broker.carrier.open(&params.carried, &params.oauth_token)?;

		if &secret != session.request_token.secret() {
			return Err(ProtocolError::SecretMismatch.into());
		}

		let authorized = AuthorizedCallback {
			request_token: session.request_token.clone(),
			verifier: params.oauth_verifier,
		};

		self.state = ExchangeState::Authorized(authorized);

		Ok(())
	}

	/// Runs step 3 and completes the exchange.
	pub async fn finish(&mut self) -> Result<AccessToken> {
		let ExchangeState::Authorized(callback) = &self.state else {
			return Err(self.out_of_order(FlowStage::Authorized).into());
		};
		let access_token = self.broker.exchange_verifier(callback.clone()).await?;

		self.state = ExchangeState::AccessTokenObtained;

		Ok(access_token)
	}

	fn expect_stage(&self, expected: FlowStage) -> Result<(), ProtocolError> {
		if self.stage() == expected { Ok(()) } else { Err(self.out_of_order(expected)) }
	}

	fn out_of_order(&self, expected: FlowStage) -> ProtocolError {
		ProtocolError::OutOfOrder { expected, actual: self.stage() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{CredentialPair, RequestToken},
		http::{ProviderRequest, ProviderResponse, TransportFuture},
		provider::ProviderDescriptor,
	};

	struct Scripted;
	impl ProviderHttpClient for Scripted {
		fn execute(&self, request: ProviderRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				let body = if request.url().path().ends_with("getRequestToken") {
					"oauth_token=RT1&oauth_token_secret=RTS1&oauth_callback_confirmed=true"
				} else {
					"oauth_token=AT1&oauth_token_secret=ATS1"
				};

				Ok(ProviderResponse::new(200, body))
			})
		}
	}

	fn broker() -> Broker<Scripted> {
		Broker::with_http_client(
			ProviderDescriptor::smugmug().expect("SmugMug descriptor should build."),
			CredentialPair::new("ck", "cs"),
			Url::parse("https://broker.example.com/api/callback").expect("Callback should parse."),
			Scripted,
		)
		.expect("Broker fixture should build.")
	}

	#[tokio::test]
	async fn finish_before_start_is_out_of_order() {
		let broker = broker();
		let mut exchange = TokenExchange::new(&broker);
		let err = exchange.finish().await.expect_err("Step 3 cannot run first.");

		assert!(matches!(
			err,
			Error::Protocol(ProtocolError::OutOfOrder {
				expected: FlowStage::Authorized,
				actual: FlowStage::Unstarted,
			})
		));
		assert_eq!(err.http_status(), 409);
	}

	#[tokio::test]
	async fn full_exchange_walks_every_stage() {
		let broker = broker();
		let mut exchange = TokenExchange::new(&broker);
		let session = exchange.start().await.expect("Step 1 should succeed.");

		assert_eq!(exchange.stage(), FlowStage::RequestTokenObtained);
		assert!(exchange.start().await.is_err(), "Step 1 cannot run twice.");

		exchange
			.authorize(CallbackParams::new("RT1", "V1", session.carried_secret))
			.expect("Matching callback should authorize.");

		let access = exchange.finish().await.expect("Step 3 should succeed.");

		assert_eq!(access.key(), "AT1");
		assert_eq!(access.secret().expose(), "ATS1");
		assert_eq!(exchange.stage(), FlowStage::AccessTokenObtained);
		assert!(exchange.finish().await.is_err(), "Step 3 cannot run twice.");
	}

	#[tokio::test]
	async fn mismatching_callbacks_are_rejected() {
		let broker = broker();
		let mut exchange = TokenExchange::new(&broker);
		let session = exchange.start().await.expect("Step 1 should succeed.");
		let err = exchange
			.authorize(CallbackParams::new("RT2", "V1", session.carried_secret.clone()))
			.expect_err("Foreign token must be rejected.");

		assert!(matches!(err, Error::Protocol(ProtocolError::TokenMismatch)));

		let forged = broker
			.carrier
			.seal(&RequestToken::new(CredentialPair::new("RT1", "other")));
		let err = exchange
			.authorize(CallbackParams::new("RT1", "V1", forged))
			.expect_err("A different secret must be rejected.");

		assert!(matches!(err, Error::Protocol(ProtocolError::SecretMismatch)));
		assert_eq!(exchange.stage(), FlowStage::RequestTokenObtained);
	}
}
