//! Credential pairs for the consumer, request-token, and access-token lifecycles.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Key plus secret, the unit every OAuth 1.0a credential is expressed in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Public identifier (`oauth_consumer_key` or `oauth_token`).
	pub key: String,
	/// Shared secret used when deriving the signing key.
	pub secret: TokenSecret,
}
impl CredentialPair {
	/// Builds a pair from raw key and secret strings.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { key: key.into(), secret: TokenSecret::new(secret) }
	}

	/// Returns true when either half is empty.
	pub fn is_incomplete(&self) -> bool {
		self.key.is_empty() || self.secret.is_empty()
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("key", &self.key)
			.field("secret", &self.secret)
			.finish()
	}
}

/// Short-lived credential issued by step 1 and consumed by the verifier exchange.
///
/// The exchange takes the token by value so a request token cannot be replayed after it
/// has been traded for an access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestToken(CredentialPair);
impl RequestToken {
	/// Wraps a credential pair returned by the request-token endpoint.
	pub fn new(pair: CredentialPair) -> Self {
		Self(pair)
	}

	/// Returns the `oauth_token` value.
	pub fn key(&self) -> &str {
		&self.0.key
	}

	/// Returns the request-token secret.
	pub fn secret(&self) -> &TokenSecret {
		&self.0.secret
	}

	/// Borrows the underlying pair for signing.
	pub fn as_pair(&self) -> &CredentialPair {
		&self.0
	}
}

/// Long-lived credential authorizing API calls on a user's behalf.
///
/// The broker never stores access tokens; callers own their persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken(CredentialPair);
impl AccessToken {
	/// Builds an access token from the values a client application supplies.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self(CredentialPair::new(key, secret))
	}

	/// Returns the `oauth_token` value.
	pub fn key(&self) -> &str {
		&self.0.key
	}

	/// Returns the access-token secret.
	pub fn secret(&self) -> &TokenSecret {
		&self.0.secret
	}

	/// Borrows the underlying pair for signing.
	pub fn as_pair(&self) -> &CredentialPair {
		&self.0
	}
}
impl From<CredentialPair> for AccessToken {
	fn from(pair: CredentialPair) -> Self {
		Self(pair)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_output_never_prints_secrets() {
		let pair = CredentialPair::new("ck", "cs");
		let rendered = format!("{pair:?}");

		assert!(rendered.contains("ck"));
		assert!(!rendered.contains("cs\""));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn incomplete_pairs_are_detected() {
		assert!(CredentialPair::new("", "cs").is_incomplete());
		assert!(CredentialPair::new("ck", "").is_incomplete());
		assert!(!CredentialPair::new("ck", "cs").is_incomplete());
	}
}
