//! Framework-agnostic request handlers behind the `/api/*` routes.
//!
//! Every handler takes already-extracted request pieces (query pairs, method, body bytes,
//! cookie header) and always answers with a [`GatewayResponse`]; errors become the JSON
//! envelope `{error, details}` instead of propagating. The `server` module binds these
//! handlers to an HTTP framework.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Nickname, NodeId},
	error::ValidationError,
	flows::{Broker, CallbackParams},
	http::ProviderHttpClient,
	provider::HttpMethod,
	signer::{percent_decode, percent_encode},
};

/// Cookie carrying the sealed request-token secret from start-oauth to the callback.
pub const CARRIER_COOKIE: &str = "oauth1_broker_rts";
/// Lifetime of the carrier cookie in seconds.
pub const CARRIER_COOKIE_MAX_AGE: u64 = 600;

const CREATE_FOLDER_FIELDS: &[&str] = &["access_token", "access_token_secret", "folder_name"];
const USER_INFO_FIELDS: &[&str] = &["access_token", "access_token_secret"];
const GET_FOLDERS_FIELDS: &[&str] = &["accessToken", "accessTokenSecret", "nickname"];
const UPDATE_FOLDER_FIELDS: &[&str] =
	&["accessToken", "accessTokenSecret", "nickname", "folderId", "newFolderName"];
// Token secrets may legitimately be empty; presence is still required.
const SECRET_FIELDS: &[&str] = &["access_token_secret", "accessTokenSecret"];

/// Body of a gateway response.
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayBody {
	/// JSON document.
	Json(JsonValue),
	/// Redirect target for a `302 Found`.
	Redirect(Url),
}

/// Status, body, and optional `Set-Cookie` value produced by a handler.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body.
	pub body: GatewayBody,
	/// `Set-Cookie` header value, if any.
	pub set_cookie: Option<String>,
}
impl GatewayResponse {
	/// JSON response with `status`.
	pub fn json(status: u16, value: JsonValue) -> Self {
		Self { status, body: GatewayBody::Json(value), set_cookie: None }
	}

	/// `302 Found` to `location`.
	pub fn redirect(location: Url) -> Self {
		Self { status: 302, body: GatewayBody::Redirect(location), set_cookie: None }
	}

	/// Error envelope for `err`, using `context` as the `error` label.
	///
	/// Validation failures report `Missing required fields` plus the `required` list.
	pub fn failure(context: &'static str, err: &Error) -> Self {
		let status = err.http_status();

		#[cfg(feature = "tracing")]
		tracing::warn!(status, error = %err, "{context}");

		let body = match err {
			Error::Validation(ValidationError::MissingFields { required, .. }) => serde_json::json!({
				"error": "Missing required fields",
				"details": err.to_string(),
				"required": required,
			}),
			_ => serde_json::json!({ "error": context, "details": err.details() }),
		};

		Self::json(status, body)
	}

	/// `405 Method Not Allowed` envelope.
	pub fn method_not_allowed(allowed: HttpMethod) -> Self {
		Self::json(
			405,
			serde_json::json!({
				"error": "Method not allowed",
				"details": format!("Use {allowed}."),
			}),
		)
	}

	fn with_cookie(mut self, cookie: String) -> Self {
		self.set_cookie = Some(cookie);

		self
	}

	/// Returns the JSON body, if any.
	pub fn json_body(&self) -> Option<&JsonValue> {
		match &self.body {
			GatewayBody::Json(value) => Some(value),
			GatewayBody::Redirect(_) => None,
		}
	}
}

/// Handler set bound to one broker.
pub struct Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	broker: Broker<C>,
	client_redirect: Option<Url>,
}
impl<C> Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Wraps `broker`; the callback answers with JSON until a client redirect is set.
	pub fn new(broker: Broker<C>) -> Self {
		Self { broker, client_redirect: None }
	}

	/// Sends the user agent to `url` with `access_token` and `access_secret` after step 3.
	pub fn with_client_redirect(mut self, url: Option<Url>) -> Self {
		self.client_redirect = url;

		self
	}

	/// Underlying broker.
	pub fn broker(&self) -> &Broker<C> {
		&self.broker
	}

	/// `GET /api/start-oauth`: obtains a request token and redirects to the authorize page.
	///
	/// The carried secret is set as a short-lived `HttpOnly` cookie scoped to the callback
	/// path.
	pub async fn start_oauth(&self) -> GatewayResponse {
		match self.broker.request_token().await {
			Ok(session) => GatewayResponse::redirect(session.authorize_url)
				.with_cookie(self.carrier_cookie(&session.carried_secret)),
			Err(e) => GatewayResponse::failure("Failed to get request token", &e),
		}
	}

	/// `GET /api/callback`: recovers the carried secret and trades the verifier.
	///
	/// `cookie_header` is the raw `Cookie` header, if the user agent sent one.
	pub async fn callback<I, K, V>(&self, query: I, cookie_header: Option<&str>) -> GatewayResponse
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let cookie = cookie_header.and_then(|header| cookie_value(header, CARRIER_COOKIE));
		let result = match CallbackParams::from_query(query, cookie.as_deref()) {
			Ok(params) => self.broker.complete(params).await,
			Err(e) => Err(e.into()),
		};
		let access = match result {
			Ok(access) => access,
			Err(e) =>
				return GatewayResponse::failure("OAuth callback failed", &e)
					.with_cookie(self.expired_carrier_cookie()),
		};
		let response = match &self.client_redirect {
			Some(client) => {
				let mut location = client.clone();

				location
					.query_pairs_mut()
					.append_pair("access_token", access.key())
					.append_pair("access_secret", access.secret().expose());

				GatewayResponse::redirect(location)
			},
			None => GatewayResponse::json(
				200,
				serde_json::json!({
					"message": "Access token received",
					"data": {
						"access_token": access.key(),
						"access_secret": access.secret().expose(),
					},
				}),
			),
		};

		response.with_cookie(self.expired_carrier_cookie())
	}

	/// `GET|POST /api/create-folder?access_token&access_token_secret&folder_name`.
	pub async fn create_folder<I, K, V>(&self, query: I) -> GatewayResponse
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		const CONTEXT: &str = "Failed to create folder";

		let params = Params::from_query(query);

		if let Err(e) = params.require(CREATE_FOLDER_FIELDS) {
			return GatewayResponse::failure(CONTEXT, &e.into());
		}

		let token = AccessToken::new(params.get("access_token"), params.get("access_token_secret"));

		match self.broker.api().create_folder(&token, params.get("folder_name")).await {
			Ok(response) => GatewayResponse::json(
				response.status,
				serde_json::json!({ "message": "Folder created", "data": response.body }),
			),
			Err(e) => GatewayResponse::failure(CONTEXT, &e),
		}
	}

	/// `POST /api/get-folders {accessToken, accessTokenSecret, nickname}`.
	pub async fn get_folders(&self, method: &str, body: &[u8]) -> GatewayResponse {
		const CONTEXT: &str = "Failed to get folders";

		if !is_post(method) {
			return GatewayResponse::method_not_allowed(HttpMethod::Post);
		}

		let result = async {
			let params = Params::from_json(body)?;

			params.require(GET_FOLDERS_FIELDS)?;

			let token = AccessToken::new(params.get("accessToken"), params.get("accessTokenSecret"));
			let nickname = Nickname::new(params.get("nickname"))?;

			self.broker.api().list_folders(&token, &nickname).await
		}
		.await;

		match result {
			Ok(listing) => GatewayResponse::json(
				200,
				serde_json::json!({
					"message": "Folders retrieved successfully",
					"totalFolders": listing.folders.len(),
					"folders": listing.folders,
					"rawResponse": listing.raw,
				}),
			),
			Err(e) => GatewayResponse::failure(CONTEXT, &e),
		}
	}

	/// `POST /api/update-folder {accessToken, accessTokenSecret, nickname, folderId,
	/// newFolderName}`.
	pub async fn update_folder(&self, method: &str, body: &[u8]) -> GatewayResponse {
		const CONTEXT: &str = "Failed to update folder";

		if !is_post(method) {
			return GatewayResponse::method_not_allowed(HttpMethod::Post);
		}

		let result = async {
			let params = Params::from_json(body)?;

			params.require(UPDATE_FOLDER_FIELDS)?;

			let token = AccessToken::new(params.get("accessToken"), params.get("accessTokenSecret"));
			let nickname = Nickname::new(params.get("nickname"))?;
			let folder_id = NodeId::new(params.get("folderId"))?;
			let new_name = params.get("newFolderName");
			let response =
				self.broker.api().update_folder(&token, &nickname, &folder_id, new_name).await?;

			Ok::<_, Error>((response, folder_id, new_name.to_owned()))
		}
		.await;

		match result {
			Ok((response, folder_id, new_name)) => GatewayResponse::json(
				200,
				serde_json::json!({
					"message": "Folder updated successfully",
					"result": response.body,
					"updatedFolder": { "id": folder_id, "newName": new_name },
				}),
			),
			Err(e) => GatewayResponse::failure(CONTEXT, &e),
		}
	}

	/// `GET /api/userinfo?access_token&access_token_secret`.
	pub async fn user_info<I, K, V>(&self, query: I) -> GatewayResponse
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		const CONTEXT: &str = "Failed to retrieve user info";

		let params = Params::from_query(query);

		if let Err(e) = params.require(USER_INFO_FIELDS) {
			return GatewayResponse::failure(CONTEXT, &e.into());
		}

		let token = AccessToken::new(params.get("access_token"), params.get("access_token_secret"));

		match self.broker.api().user_info(&token).await {
			Ok(info) => GatewayResponse::json(
				200,
				serde_json::json!({
					"message": "User info retrieved successfully",
					"nickname": info.nickname,
					"raw": info.raw,
				}),
			),
			Err(e) => GatewayResponse::failure(CONTEXT, &e),
		}
	}

	fn carrier_cookie(&self, carried: &str) -> String {
		format!(
			"{CARRIER_COOKIE}={}; Path={}; Max-Age={CARRIER_COOKIE_MAX_AGE}; HttpOnly;{} SameSite=Lax",
			percent_encode(carried),
			self.broker.callback.path(),
			self.secure_attribute(),
		)
	}

	fn expired_carrier_cookie(&self) -> String {
		format!(
			"{CARRIER_COOKIE}=; Path={}; Max-Age=0; HttpOnly;{} SameSite=Lax",
			self.broker.callback.path(),
			self.secure_attribute(),
		)
	}

	fn secure_attribute(&self) -> &'static str {
		if self.broker.callback.scheme() == "https" { " Secure;" } else { "" }
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("broker", &self.broker)
			.field("client_redirect", &self.client_redirect.as_ref().map(Url::as_str))
			.finish()
	}
}

/// Caller-supplied string parameters from a query string or a JSON object body.
#[derive(Debug, Default)]
struct Params(BTreeMap<String, String>);
impl Params {
	fn from_query<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut params = BTreeMap::new();

		for (key, value) in pairs {
			params.entry(key.as_ref().to_owned()).or_insert_with(|| value.as_ref().to_owned());
		}

		Self(params)
	}

	/// Strings are taken verbatim and numbers by their JSON text; other values are ignored.
	fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
		let deserializer = &mut serde_json::Deserializer::from_slice(body);
		let object: BTreeMap<String, JsonValue> = serde_path_to_error::deserialize(deserializer)
			.map_err(|source| ValidationError::MalformedBody { source })?;
		let params = object
			.into_iter()
			.filter_map(|(key, value)| match value {
				JsonValue::String(value) => Some((key, value)),
				JsonValue::Number(value) => Some((key, value.to_string())),
				_ => None,
			})
			.collect();

		Ok(Self(params))
	}

	fn require(&self, required: &'static [&'static str]) -> Result<(), ValidationError> {
		let missing = required
			.iter()
			.copied()
			.filter(|name| match self.0.get(*name) {
				None => true,
				Some(value) => value.is_empty() && !SECRET_FIELDS.contains(name),
			})
			.collect::<Vec<_>>();

		if missing.is_empty() { Ok(()) } else { Err(ValidationError::MissingFields { missing, required }) }
	}

	fn get(&self, name: &str) -> &str {
		self.0.get(name).map(String::as_str).unwrap_or_default()
	}
}

fn is_post(method: &str) -> bool {
	method.parse::<HttpMethod>() == Ok(HttpMethod::Post)
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
	header
		.split(';')
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(key, _)| *key == name)
		.and_then(|(_, value)| percent_decode(value.trim_matches('"')).ok())
		.filter(|value| !value.is_empty())
}
