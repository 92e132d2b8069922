//! Transport primitives for signed provider calls.
//!
//! The module exposes [`ProviderHttpClient`] so downstream crates can plug in a custom HTTP
//! stack. The broker hands every implementation an already-signed, immutable
//! [`ProviderRequest`]; transports never touch parameters or credentials, which keeps the
//! signature valid for exactly the bytes that go on the wire.

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	error::TransportError,
	obs,
	provider::HttpMethod,
	signer::{SignableRequest, Signer, percent_encode},
};

/// Boxed future returned by [`ProviderHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ProviderResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing signed provider requests.
///
/// The trait is the broker's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so they can be shared across broker instances behind an `Arc`,
/// and must honor [`ProviderRequest::timeout`], reporting expiry as
/// [`TransportError::Timeout`]. Redirects must not be followed: token endpoints answer
/// directly.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and collects the full response body.
	fn execute(&self, request: ProviderRequest) -> TransportFuture<'_>;
}

/// Shape the provider is asked to answer in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormat {
	/// `application/x-www-form-urlencoded` token responses.
	Form,
	/// JSON API responses (`Accept: application/json`).
	Json,
}

/// Signed request ready for transmission.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
	method: HttpMethod,
	url: Url,
	authorization: String,
	form: Vec<(String, String)>,
	json: Option<JsonValue>,
	format: ResponseFormat,
	timeout: StdDuration,
}
impl ProviderRequest {
	/// HTTP method.
	pub fn method(&self) -> HttpMethod {
		self.method
	}

	/// Target URL including any signed query pairs.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// `Authorization` header value.
	pub fn authorization(&self) -> &str {
		&self.authorization
	}

	/// Signed form fields to send as an `application/x-www-form-urlencoded` body.
	pub fn form(&self) -> &[(String, String)] {
		&self.form
	}

	/// Encoded form body, if the request carries form fields.
	pub fn form_body(&self) -> Option<String> {
		if self.form.is_empty() {
			return None;
		}

		Some(
			self.form
				.iter()
				.map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
				.collect::<Vec<_>>()
				.join("&"),
		)
	}

	/// Unsigned JSON body.
	pub fn json(&self) -> Option<&JsonValue> {
		self.json.as_ref()
	}

	/// Expected response shape.
	pub fn format(&self) -> ResponseFormat {
		self.format
	}

	/// Upper bound for the whole exchange.
	pub fn timeout(&self) -> StdDuration {
		self.timeout
	}
}

/// Raw provider response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Builds a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Assembles, signs, and sends one provider call.
///
/// Signing happens inside [`SignedCall::send`], immediately before the request is handed
/// to the transport.
#[derive(Clone, Debug)]
pub(crate) struct SignedCall {
	request: SignableRequest,
	json: Option<JsonValue>,
	format: ResponseFormat,
}
impl SignedCall {
	pub(crate) fn new(method: HttpMethod, url: Url, format: ResponseFormat) -> Self {
		Self { request: SignableRequest::new(method, url), json: None, format }
	}

	pub(crate) fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.request = self.request.param(key, value);

		self
	}

	pub(crate) fn json(mut self, body: Option<JsonValue>) -> Self {
		self.json = body;

		self
	}

	pub(crate) async fn send<C>(
		self,
		http: &C,
		signer: &Signer,
		token: Option<&CredentialPair>,
		timeout: StdDuration,
	) -> Result<ProviderResponse>
	where
		C: ?Sized + ProviderHttpClient,
	{
		let authorization = signer.sign(&self.request, token)?;
		let form = self.request.form_parameters().cloned().collect();
		let request = ProviderRequest {
			method: self.request.method(),
			url: self.request.url().clone(),
			authorization: authorization.as_str().to_owned(),
			form,
			json: self.json,
			format: self.format,
			timeout,
		};

		let response = http.execute(request).await?;

		obs::record_provider_status(response.status);

		Ok(response)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints answer directly, so configure any custom [`ReqwestClient`] to disable
/// redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl Default for ReqwestHttpClient {
	fn default() -> Self {
		let builder = || ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());
		let client = builder().build().or_else(|e| {
			#[cfg(feature = "tracing")]
			tracing::warn!(error = %e, "reqwest client build failed, retrying without proxy discovery");
			#[cfg(not(feature = "tracing"))]
			let _ = e;

			builder().no_proxy().build()
		});
		let client = match client {
			Ok(client) => client,
			Err(e) => {
				#[cfg(feature = "tracing")]
				tracing::error!(
					error = %e,
					"reqwest client build failed twice, falling back to a client that follows redirects"
				);
				#[cfg(not(feature = "tracing"))]
				let _ = e;

				ReqwestClient::default()
			},
		};

		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ProviderRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut builder = self
				.0
				.request(request.method().into(), request.url().clone())
				.timeout(request.timeout())
				.header(reqwest::header::AUTHORIZATION, request.authorization());

			if request.format() == ResponseFormat::Json {
				builder = builder.header(reqwest::header::ACCEPT, "application/json");
			}
			if let Some(body) = request.json() {
				builder = builder
					.header(reqwest::header::CONTENT_TYPE, "application/json")
					.body(body.to_string());
			} else if let Some(form) = request.form_body() {
				builder = builder
					.header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
					.body(form);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(ProviderResponse { status, body })
		})
	}
}
