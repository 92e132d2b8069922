//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	io,
	sync::{Arc, Mutex},
};
// crates.io
use url::Url;
// self
use oauth1_broker::{
	auth::{CredentialPair, ProviderId},
	error::TransportError,
	flows::Broker,
	http::{ProviderHttpClient, ProviderRequest, ProviderResponse, TransportFuture},
	provider::{ProviderDescriptor, ProviderDescriptorBuilder},
	signer::FixedEntropy,
};

pub const CONSUMER_KEY: &str = "ck-it";
pub const CONSUMER_SECRET: &str = "cs-it";
pub const CALLBACK: &str = "https://broker.example.com/api/callback";
pub const NONCE: &str = "fixednonce";
pub const TIMESTAMP: u64 = 1_700_000_000;

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse integration fixture URL.")
}

pub fn consumer() -> CredentialPair {
	CredentialPair::new(CONSUMER_KEY, CONSUMER_SECRET)
}

/// Descriptor whose endpoints all live under `base` (an `http://127.0.0.1:<port>` mock).
pub fn descriptor_builder(base: &str) -> ProviderDescriptorBuilder {
	let base = base.trim_end_matches('/');

	ProviderDescriptor::builder(
		ProviderId::new("mock-smugmug").expect("Provider fixture should be valid."),
	)
	.request_token_endpoint(url(&format!("{base}/services/oauth/1.0a/getRequestToken")))
	.authorize_endpoint(url(&format!("{base}/services/oauth/1.0a/authorize")))
	.access_token_endpoint(url(&format!("{base}/services/oauth/1.0a/getAccessToken")))
	.api_base(url(base))
}

pub fn descriptor(base: &str) -> ProviderDescriptor {
	descriptor_builder(base).build().expect("Mock descriptor should build.")
}

/// Broker with pinned nonce and timestamp over any transport.
pub fn broker_with<C>(descriptor: ProviderDescriptor, http_client: Arc<C>) -> Broker<C>
where
	C: ProviderHttpClient,
{
	Broker::with_http_client(descriptor, consumer(), url(CALLBACK), http_client)
		.expect("Broker fixture should build.")
		.with_entropy(FixedEntropy::new(NONCE, TIMESTAMP))
}

/// Transport replaying scripted responses and recording every request it receives.
#[derive(Default)]
pub struct RecordingTransport {
	responses: Mutex<VecDeque<ProviderResponse>>,
	requests: Mutex<Vec<ProviderRequest>>,
}
impl RecordingTransport {
	pub fn new<I>(responses: I) -> Arc<Self>
	where
		I: IntoIterator<Item = ProviderResponse>,
	{
		Arc::new(Self {
			responses: Mutex::new(responses.into_iter().collect()),
			requests: Mutex::default(),
		})
	}

	pub fn requests(&self) -> Vec<ProviderRequest> {
		self.requests.lock().expect("Request log lock should not be poisoned.").clone()
	}
}
impl ProviderHttpClient for RecordingTransport {
	fn execute(&self, request: ProviderRequest) -> TransportFuture<'_> {
		let response =
			self.responses.lock().expect("Response queue lock should not be poisoned.").pop_front();

		self.requests.lock().expect("Request log lock should not be poisoned.").push(request);

		Box::pin(async move {
			response.ok_or_else(|| TransportError::Io(io::Error::other("no scripted response")))
		})
	}
}

pub fn form(status: u16, body: &str) -> ProviderResponse {
	ProviderResponse::new(status, body)
}

pub fn json(status: u16, body: serde_json::Value) -> ProviderResponse {
	ProviderResponse::new(status, body.to_string())
}

pub fn authuser(nickname: &str) -> serde_json::Value {
	serde_json::json!({ "Response": { "User": { "NickName": nickname } } })
}
