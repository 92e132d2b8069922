//! Startup configuration loaded from the process environment.

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	error::ConfigError,
	flows::DEFAULT_TIMEOUT,
	provider::ProviderDescriptor,
};

/// Consumer key variable.
pub const CONSUMER_KEY_ENV: &str = "SMUGMUG_CONSUMER_KEY";
/// Consumer secret variable.
pub const CONSUMER_SECRET_ENV: &str = "SMUGMUG_CONSUMER_SECRET";
/// Callback URL announced in step 1.
pub const CALLBACK_URL_ENV: &str = "CALLBACK_URL";
/// Optional client application the callback redirects to with the access token.
pub const CLIENT_REDIRECT_URL_ENV: &str = "CLIENT_REDIRECT_URL";
/// Optional per-request timeout in whole seconds.
pub const TIMEOUT_SECS_ENV: &str = "SMUGMUG_TIMEOUT_SECS";

/// Immutable broker configuration.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
	/// Consumer credentials issued by the provider.
	pub consumer: CredentialPair,
	/// Callback URL announced as `oauth_callback`.
	pub callback: Url,
	/// Where the callback handler sends the user agent after step 3.
	pub client_redirect: Option<Url>,
	/// Upper bound for each outbound request.
	pub timeout: StdDuration,
	/// Provider endpoints and quirks.
	pub descriptor: ProviderDescriptor,
}
impl BrokerConfig {
	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads configuration through `lookup`, which maps a variable name to its value.
	///
	/// Empty values count as unset. The provider defaults to SmugMug.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |name: &str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let require = |name: &'static str| get(name).ok_or(ConfigError::MissingEnv { name });
		let parse_url = |name: &'static str, raw: String| {
			Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { name, source })
		};
		let consumer =
			CredentialPair::new(require(CONSUMER_KEY_ENV)?, require(CONSUMER_SECRET_ENV)?);
		let callback = parse_url(CALLBACK_URL_ENV, require(CALLBACK_URL_ENV)?)?;
		let client_redirect = get(CLIENT_REDIRECT_URL_ENV)
			.map(|raw| parse_url(CLIENT_REDIRECT_URL_ENV, raw))
			.transpose()?;
		let timeout = match get(TIMEOUT_SECS_ENV) {
			Some(raw) => match raw.parse::<u64>() {
				Ok(secs) if secs > 0 => StdDuration::from_secs(secs),
				_ => return Err(ConfigError::InvalidTimeout { name: TIMEOUT_SECS_ENV, value: raw }),
			},
			None => DEFAULT_TIMEOUT,
		};

		Ok(Self {
			consumer,
			callback,
			client_redirect,
			timeout,
			descriptor: ProviderDescriptor::smugmug()?,
		})
	}

	/// Replaces the provider descriptor.
	pub fn with_descriptor(mut self, descriptor: ProviderDescriptor) -> Self {
		self.descriptor = descriptor;

		self
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = vars
			.iter()
			.map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
			.collect::<HashMap<_, _>>();

		move |name: &str| vars.get(name).cloned()
	}

	#[test]
	fn loads_required_and_optional_values() {
		let config = BrokerConfig::from_lookup(lookup(&[
			(CONSUMER_KEY_ENV, "ck"),
			(CONSUMER_SECRET_ENV, "cs"),
			(CALLBACK_URL_ENV, "https://broker.example.com/api/callback"),
			(CLIENT_REDIRECT_URL_ENV, "https://app.example.com/done"),
			(TIMEOUT_SECS_ENV, "5"),
		]))
		.expect("Complete configuration should load.");

		assert_eq!(config.consumer.key, "ck");
		assert_eq!(config.callback.path(), "/api/callback");
		assert_eq!(
			config.client_redirect.map(String::from).as_deref(),
			Some("https://app.example.com/done")
		);
		assert_eq!(config.timeout, StdDuration::from_secs(5));
	}

	#[test]
	fn missing_consumer_secret_is_fatal() {
		let err = BrokerConfig::from_lookup(lookup(&[
			(CONSUMER_KEY_ENV, "ck"),
			(CONSUMER_SECRET_ENV, "  "),
			(CALLBACK_URL_ENV, "https://broker.example.com/api/callback"),
		]))
		.expect_err("Blank consumer secret must fail.");

		assert!(matches!(err, ConfigError::MissingEnv { name: CONSUMER_SECRET_ENV }));
	}

	#[test]
	fn invalid_values_are_rejected() {
		let base = [
			(CONSUMER_KEY_ENV, "ck"),
			(CONSUMER_SECRET_ENV, "cs"),
			(CALLBACK_URL_ENV, "not a url"),
		];

		assert!(matches!(
			BrokerConfig::from_lookup(lookup(&base)),
			Err(ConfigError::InvalidUrl { name: CALLBACK_URL_ENV, .. })
		));

		let err = BrokerConfig::from_lookup(lookup(&[
			(CONSUMER_KEY_ENV, "ck"),
			(CONSUMER_SECRET_ENV, "cs"),
			(CALLBACK_URL_ENV, "https://broker.example.com/api/callback"),
			(TIMEOUT_SECS_ENV, "0"),
		]))
		.expect_err("Zero timeout must fail.");

		assert!(matches!(err, ConfigError::InvalidTimeout { ref value, .. } if value == "0"));
	}
}
