//! Step 1 (request token), step 2 (authorize URL), and step 3 (verifier exchange).

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken},
	flows::{AuthorizedCallback, Broker, CallbackParams, common},
	http::{ProviderHttpClient, ResponseFormat, SignedCall},
	obs::{self, FlowKind},
	provider::HttpMethod,
};

/// Everything the redirect chain needs after step 1.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationSession {
	/// Request token issued by the provider.
	pub request_token: RequestToken,
	/// Authorization page the user agent must visit.
	pub authorize_url: Url,
	/// Value carrying the request-token secret back to the callback.
	///
	/// Readable by anyone who sees it; a sealed value is tamper-evident, not encrypted.
	pub carried_secret: String,
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("request_token", &self.request_token)
			.field("authorize_url", &self.authorize_url.as_str())
			.field("carried_secret", &"<redacted>")
			.finish()
	}
}

impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Obtains a request token and prepares the authorization redirect.
	///
	/// The request is signed with consumer credentials only and announces the configured
	/// callback as `oauth_callback`.
	pub async fn request_token(&self) -> Result<AuthorizationSession> {
		obs::observe(FlowKind::RequestToken, "request_token", async move {
			let response = SignedCall::new(
				HttpMethod::Post,
				self.descriptor.endpoints.request_token.clone(),
				ResponseFormat::Form,
			)
			.param("oauth_callback", self.callback.as_str())
			.send(self.http_client.as_ref(), &self.signer, None, self.timeout)
			.await?;
			let fields = common::token_fields(&response)?;
			let body = response.text();

			common::ensure_callback_confirmed(
				&fields,
				self.descriptor.quirks.require_callback_confirmed,
				Some(response.status),
				&body,
			)?;

			let request_token = RequestToken::new(common::credentials_from(
				&fields,
				Some(response.status),
				&body,
			)?);
			let authorize_url = self.authorize_url(&request_token);
			let carried_secret = self.carrier.seal(&request_token);

			Ok(AuthorizationSession { request_token, authorize_url, carried_secret })
		})
		.await
	}

	/// Builds `authorize?oauth_token=<token>` for the user agent.
	pub fn authorize_url(&self, request_token: &RequestToken) -> Url {
		let mut url = self.descriptor.endpoints.authorize.clone();

		url.query_pairs_mut().append_pair("oauth_token", request_token.key());

		url
	}

	/// Trades an authorized request token for an access token.
	///
	/// The request token is consumed so it cannot be replayed by the same caller. The call
	/// uses the descriptor's access-token method and signs `oauth_verifier` with the request
	/// token pair.
	pub async fn exchange_verifier(&self, callback: AuthorizedCallback) -> Result<AccessToken> {
		obs::observe(FlowKind::AccessToken, "exchange_verifier", async move {
			let AuthorizedCallback { request_token, verifier } = callback;
			let response = SignedCall::new(
				self.descriptor.quirks.access_token_method,
				self.descriptor.endpoints.access_token.clone(),
				ResponseFormat::Form,
			)
			.param("oauth_verifier", verifier)
			.send(
				self.http_client.as_ref(),
				&self.signer,
				Some(request_token.as_pair()),
				self.timeout,
			)
			.await?;
			let fields = common::token_fields(&response)?;
			let pair = common::credentials_from(&fields, Some(response.status), &response.text())?;

			Ok(AccessToken::from(pair))
		})
		.await
	}

	/// Recovers the carried secret from `params` and runs step 3.
	pub async fn complete(&self, params: CallbackParams) -> Result<AccessToken> {
		let callback = self.authorize_callback(params)?;

		self.exchange_verifier(callback).await
	}
}
