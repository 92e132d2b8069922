//! Three-legged OAuth 1.0a handshake orchestrated by the broker.
//!
//! [`Broker`] is stateless across requests: step 1 returns everything the redirect chain
//! needs (including the carried secret), and the callback hands it back. The
//! [`TokenExchange`] driver layers in-process ordering checks on top for callers that keep
//! the whole handshake in one task.

pub mod callback;
pub mod common;
pub mod exchange;
pub mod handshake;

pub use callback::*;
pub use common::*;
pub use exchange::*;
pub use handshake::*;

// self
use crate::{
	_prelude::*,
	api::ApiClient,
	auth::CredentialPair,
	carrier::{SealedCarrier, SecretCarrier},
	config::BrokerConfig,
	error::ConfigError,
	http::ProviderHttpClient,
	provider::ProviderDescriptor,
	signer::{Entropy, Signer},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Default upper bound for every outbound provider request.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient>;

/// Coordinates the OAuth 1.0a handshake against a single provider descriptor.
///
/// The broker owns the HTTP client, signer, and secret carrier so individual steps can
/// focus on protocol logic. Consumer credentials live inside the signer and are never
/// mutated after construction.
pub struct Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Provider descriptor that defines OAuth endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Signer bound to the consumer credentials.
	pub signer: Arc<Signer>,
	/// Carrier moving the request-token secret across the authorization redirect.
	pub carrier: Arc<dyn SecretCarrier>,
	/// Callback URL announced as `oauth_callback` in step 1.
	pub callback: Url,
	/// Upper bound applied to each outbound request.
	pub timeout: StdDuration,
}
impl<C> Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	///
	/// Fails when either half of the consumer credentials is empty; the broker never signs
	/// with a default secret.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		consumer: CredentialPair,
		callback: Url,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		let carrier = SealedCarrier::from_consumer(&consumer)?;

		Ok(Self {
			http_client: http_client.into(),
			descriptor,
			signer: Arc::new(Signer::new(consumer)),
			carrier: Arc::new(carrier),
			callback,
			timeout: DEFAULT_TIMEOUT,
		})
	}

	/// Replaces the secret carrier.
	pub fn with_carrier(mut self, carrier: impl 'static + SecretCarrier) -> Self {
		self.carrier = Arc::new(carrier);

		self
	}

	/// Overrides the per-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Replaces the nonce/timestamp source used by the signer.
	pub fn with_entropy(mut self, entropy: impl 'static + Entropy) -> Self {
		self.signer = Arc::new(self.signer.as_ref().clone().with_entropy(entropy));

		self
	}

	/// Returns an API client sharing this broker's transport, signer, and timeout.
	pub fn api(&self) -> ApiClient<C> {
		ApiClient::new(
			self.http_client.clone(),
			self.signer.clone(),
			self.descriptor.endpoints.api_base.clone(),
		)
		.with_timeout(self.timeout)
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient> {
	/// Creates a new broker that provisions its own reqwest-backed transport.
	pub fn new(
		descriptor: ProviderDescriptor,
		consumer: CredentialPair,
		callback: Url,
	) -> Result<Self, ConfigError> {
		Self::with_http_client(descriptor, consumer, callback, ReqwestHttpClient::default())
	}

	/// Creates a broker from loaded configuration.
	pub fn from_config(config: &BrokerConfig) -> Result<Self, ConfigError> {
		Self::from_config_with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Broker<C>
where
	C: ProviderHttpClient,
{
	/// Creates a broker from loaded configuration and a caller-provided transport.
	pub fn from_config_with_http_client(
		config: &BrokerConfig,
		http_client: C,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(
			config.descriptor.clone(),
			config.consumer.clone(),
			config.callback.clone(),
			http_client,
		)?
		.with_timeout(config.timeout))
	}
}
impl<C> Clone for Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			descriptor: self.descriptor.clone(),
			signer: self.signer.clone(),
			carrier: self.carrier.clone(),
			callback: self.callback.clone(),
			timeout: self.timeout,
		}
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("descriptor", &self.descriptor.id)
			.field("consumer_key", &self.signer.consumer_key())
			.field("callback", &self.callback.as_str())
			.field("timeout", &self.timeout)
			.finish()
	}
}
