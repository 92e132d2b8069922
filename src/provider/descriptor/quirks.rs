// self
use crate::{_prelude::*, provider::HttpMethod};

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Method used for the verifier exchange against the access-token endpoint.
	pub access_token_method: HttpMethod,
	/// Requires `oauth_callback_confirmed=true` in the request-token response.
	pub require_callback_confirmed: bool,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { access_token_method: HttpMethod::Post, require_callback_confirmed: false }
	}
}
