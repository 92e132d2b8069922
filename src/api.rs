//! Signed calls against the photo API on a user's behalf.
//!
//! [`ApiClient`] is one parameterized issuer: every operation is an
//! [`EndpointDescriptor`] plus path variables and an optional JSON body. Endpoints whose
//! path embeds the account nickname resolve it first with a separately signed
//! `!authuser` call when the caller did not supply it.

pub mod endpoint;
pub mod model;

pub use endpoint::*;
pub use model::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Nickname, NodeId},
	error::UpstreamError,
	flows::DEFAULT_TIMEOUT,
	http::{ProviderHttpClient, ProviderResponse, ResponseFormat, SignedCall},
	obs::{self, FlowKind},
	provider::HttpMethod,
	signer::Signer,
};

/// Issues signed API calls with an access token supplied per call.
///
/// The client stores no user credentials; each call signs with the token it is given.
pub struct ApiClient<C>
where
	C: ?Sized + ProviderHttpClient,
{
	http_client: Arc<C>,
	signer: Arc<Signer>,
	api_base: Url,
	timeout: StdDuration,
}
impl<C> ApiClient<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a client rooted at `api_base`.
	pub fn new(http_client: Arc<C>, signer: Arc<Signer>, api_base: Url) -> Self {
		Self { http_client, signer, api_base, timeout: DEFAULT_TIMEOUT }
	}

	/// Overrides the per-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// API base URL endpoint templates are resolved against.
	pub fn api_base(&self) -> &Url {
		&self.api_base
	}

	/// Signs and sends one call.
	///
	/// The JSON body is transmitted but not signed. Any non-2xx status becomes
	/// [`UpstreamError::Status`] carrying the provider body unmodified.
	pub async fn call(
		&self,
		method: HttpMethod,
		url: Url,
		body: Option<JsonValue>,
		token: &AccessToken,
	) -> Result<ApiResponse> {
		obs::observe(FlowKind::ApiCall, method.as_str(), async move {
			let response = SignedCall::new(method, url, ResponseFormat::Json)
				.json(body)
				.send(self.http_client.as_ref(), &self.signer, Some(token.as_pair()), self.timeout)
				.await?;
			let status = response.status;
			let body = json_body(&response);

			if !response.is_success() {
				return Err(UpstreamError::Status { status, body }.into());
			}

			Ok(ApiResponse { status, body })
		})
		.await
	}

	/// Renders `endpoint` with `vars` and calls it.
	///
	/// When the endpoint needs a nickname and `vars` lacks one, the nickname is resolved
	/// first; a failed resolution aborts before the second call.
	pub async fn invoke(
		&self,
		endpoint: &EndpointDescriptor,
		vars: &[(&str, &str)],
		body: Option<JsonValue>,
		token: &AccessToken,
	) -> Result<ApiResponse> {
		let resolved;
		let mut vars = vars.to_vec();

		if endpoint.needs_nickname() && !vars.iter().any(|(name, _)| *name == NICKNAME_VAR) {
			resolved = self.resolve_nickname(token).await?;

			vars.push((NICKNAME_VAR, resolved.as_ref()));
		}

		let url = endpoint.render(&self.api_base, &vars)?;

		self.call(endpoint.method, url, body, token).await
	}

	/// Fetches the authenticated account.
	pub async fn user_info(&self, token: &AccessToken) -> Result<UserInfo> {
		let url = AUTH_USER.render(&self.api_base, &[])?;
		let response = self.call(AUTH_USER.method, url, None, token).await?;

		decode_user_info(AUTH_USER.name, response.body)
	}

	/// Resolves the account nickname for `token`.
	pub async fn resolve_nickname(&self, token: &AccessToken) -> Result<Nickname> {
		Ok(self.user_info(token).await?.nickname)
	}

	/// Creates a folder under the user's root; the nickname is always resolved first.
	pub async fn create_folder(&self, token: &AccessToken, name: &str) -> Result<ApiResponse> {
		self.invoke(&CREATE_FOLDER, &[], Some(FolderChange::create(name).into()), token).await
	}

	/// Lists the user's folders.
	pub async fn list_folders(
		&self,
		token: &AccessToken,
		nickname: &Nickname,
	) -> Result<FolderListing> {
		let response =
			self.invoke(&LIST_FOLDERS, &[(NICKNAME_VAR, nickname.as_ref())], None, token).await?;

		decode_folder_listing(LIST_FOLDERS.name, response.body)
	}

	/// Renames a folder.
	pub async fn update_folder(
		&self,
		token: &AccessToken,
		nickname: &Nickname,
		folder_id: &NodeId,
		new_name: &str,
	) -> Result<ApiResponse> {
		self.invoke(
			&UPDATE_FOLDER,
			&[(NICKNAME_VAR, nickname.as_ref()), (FOLDER_ID_VAR, folder_id.as_ref())],
			Some(FolderChange::rename(new_name).into()),
			token,
		)
		.await
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			signer: self.signer.clone(),
			api_base: self.api_base.clone(),
			timeout: self.timeout,
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("api_base", &self.api_base.as_str())
			.field("timeout", &self.timeout)
			.finish()
	}
}

fn json_body(response: &ProviderResponse) -> JsonValue {
	if response.body.iter().all(u8::is_ascii_whitespace) {
		return JsonValue::Null;
	}

	serde_json::from_slice(&response.body).unwrap_or_else(|_| JsonValue::String(response.text()))
}
