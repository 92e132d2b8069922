//! Callback parsing and carried-secret recovery for the authorization redirect.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, RequestToken},
	error::ProtocolError,
	flows::Broker,
	http::ProviderHttpClient,
};

/// Query parameter a client application uses to thread the carried secret back.
pub const CARRIED_SECRET_PARAM: &str = "token_secret";

/// Parameters delivered to the callback after the user approves access.
#[derive(Clone, PartialEq, Eq)]
pub struct CallbackParams {
	/// Request token the provider redirected back with.
	pub oauth_token: String,
	/// Verifier proving the user approved the request token.
	pub oauth_verifier: String,
	/// Carried secret value as produced by the broker's carrier.
	pub carried: String,
}
impl CallbackParams {
	/// Builds callback parameters from already-extracted values.
	pub fn new(
		oauth_token: impl Into<String>,
		oauth_verifier: impl Into<String>,
		carried: impl Into<String>,
	) -> Self {
		Self {
			oauth_token: oauth_token.into(),
			oauth_verifier: oauth_verifier.into(),
			carried: carried.into(),
		}
	}

	/// Extracts callback parameters from decoded query pairs and the carrier cookie.
	///
	/// The carried value is looked up in order: the `token_secret` parameter, the
	/// `token_secret` query pair inside a URL-valued `oauth_callback` parameter, then the
	/// cookie. Empty values count as absent.
	pub fn from_query<I, K, V>(pairs: I, cookie: Option<&str>) -> Result<Self, ProtocolError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut query = BTreeMap::new();

		for (key, value) in pairs {
			query.entry(key.as_ref().to_owned()).or_insert_with(|| value.as_ref().to_owned());
		}

		let required = |name: &'static str| {
			query
				.get(name)
				.filter(|value| !value.is_empty())
				.cloned()
				.ok_or(ProtocolError::MissingParameter(name))
		};
		let oauth_token = required("oauth_token")?;
		let oauth_verifier = required("oauth_verifier")?;
		let carried = query
			.get(CARRIED_SECRET_PARAM)
			.filter(|value| !value.is_empty())
			.cloned()
			.or_else(|| query.get("oauth_callback").and_then(|raw| carried_in_callback(raw)))
			.or_else(|| cookie.filter(|value| !value.is_empty()).map(str::to_owned))
			.ok_or(ProtocolError::LostSecret)?;

		Ok(Self { oauth_token, oauth_verifier, carried })
	}
}
impl Debug for CallbackParams {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallbackParams")
			.field("oauth_token", &self.oauth_token)
			.field("oauth_verifier", &self.oauth_verifier)
			.field("carried", &"<redacted>")
			.finish()
	}
}

/// Callback whose carried secret has been recovered and verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizedCallback {
	/// Request token rebuilt from the callback and the recovered secret.
	pub request_token: RequestToken,
	/// Verifier to present in step 3.
	pub verifier: String,
}

impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Recovers the request-token secret for a callback.
	///
	/// No network call is made; a carried value that does not belong to the returned
	/// `oauth_token` is rejected with [`ProtocolError::SecretMismatch`].
	pub fn authorize_callback(
		&self,
		params: CallbackParams,
	) -> Result<AuthorizedCallback, ProtocolError> {
		let secret = self.carrier.open(&params.carried, &params.oauth_token)?;

		Ok(AuthorizedCallback {
			request_token: RequestToken::new(CredentialPair {
				key: params.oauth_token,
				secret,
			}),
			verifier: params.oauth_verifier,
		})
	}
}

fn carried_in_callback(raw: &str) -> Option<String> {
	let url = Url::parse(raw).ok()?;

	url.query_pairs()
		.find(|(key, value)| key == CARRIED_SECRET_PARAM && !value.is_empty())
		.map(|(_, value)| value.into_owned())
}
