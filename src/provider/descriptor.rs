//! Provider descriptor data structures and helpers shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and the HTTP method
//! vocabulary so providers can describe their endpoints in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// HTTP methods the signer and transports understand.
pub mod method;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use method::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Step 1 endpoint issuing request tokens.
	pub request_token: Url,
	/// Step 2 page the user agent is redirected to.
	pub authorize: Url,
	/// Step 3 endpoint trading a verifier for an access token.
	pub access_token: Url,
	/// Base URL that API endpoint templates are resolved against.
	pub api_base: Url,
}

/// Immutable provider descriptor consumed by flows and the API issuer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Descriptor for SmugMug's OAuth 1.0a service and v2 API.
	pub fn smugmug() -> Result<Self, ProviderDescriptorError> {
		let id = ProviderId::new("smugmug").map_err(|e| ProviderDescriptorError::InvalidEndpoint {
			endpoint: "id",
			reason: e.to_string(),
		})?;

		Self::builder(id)
			.request_token_endpoint(parse_endpoint(
				"request_token",
				"https://api.smugmug.com/services/oauth/1.0a/getRequestToken",
			)?)
			.authorize_endpoint(parse_endpoint(
				"authorize",
				"https://secure.smugmug.com/services/oauth/1.0a/authorize",
			)?)
			.access_token_endpoint(parse_endpoint(
				"access_token",
				"https://api.smugmug.com/services/oauth/1.0a/getAccessToken",
			)?)
			.api_base(parse_endpoint("api_base", "https://api.smugmug.com")?)
			.build()
	}
}

/// Parses an endpoint literal, reporting failures against the endpoint name.
pub fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw)
		.map_err(|e| ProviderDescriptorError::InvalidEndpoint { endpoint, reason: e.to_string() })
}
