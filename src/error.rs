//! Broker-level error taxonomy shared by the signer, flows, API issuer, and gateway.

// self
use crate::{
	_prelude::*,
	auth::IdentifierError,
	flows::FlowStage,
	provider::ProviderDescriptorError,
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; fatal at startup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller-supplied parameters are missing or malformed; no network call was made.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Request could not be signed.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// A handshake step failed.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Provider rejected the call or answered with an unusable payload.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns the HTTP status the gateway should answer with for this error.
	pub fn http_status(&self) -> u16 {
		match self {
			Error::Validation(_) => 400,
			Error::Protocol(err) => err.http_status(),
			Error::Upstream(UpstreamError::Status { status, .. }) if *status >= 400 => *status,
			Error::Config(_)
			| Error::Signing(_)
			| Error::Upstream(_)
			| Error::Transport(_) => 500,
		}
	}

	/// Stable, low-cardinality label for logs and metrics.
	pub const fn class(&self) -> &'static str {
		match self {
			Error::Config(_) => "config",
			Error::Validation(_) => "validation",
			Error::Signing(_) => "signing",
			Error::Protocol(_) => "protocol",
			Error::Upstream(_) => "upstream",
			Error::Transport(_) => "transport",
		}
	}

	/// Returns the `details` payload for the gateway's error envelope.
	///
	/// Provider error bodies are surfaced unmodified; every other variant renders its message.
	pub fn details(&self) -> JsonValue {
		match self {
			Error::Upstream(UpstreamError::Status { body, .. }) => body.clone(),
			Error::Protocol(ProtocolError::ExchangeFailed { body, .. }) if !body.is_empty() =>
				JsonValue::String(body.clone()),
			other => JsonValue::String(other.to_string()),
		}
	}
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		ValidationError::from(e).into()
	}
}

/// Configuration and construction failures; none of these are per-request conditions.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is absent or empty.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// A URL-valued setting cannot be parsed.
	#[error("Environment variable `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The request timeout setting is not a positive number of seconds.
	#[error("Environment variable `{name}` must be a positive number of seconds, got `{value}`.")]
	InvalidTimeout {
		/// Variable name.
		name: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// Consumer key or secret is empty.
	#[error("Consumer credentials are missing.")]
	MissingConsumerCredentials,
	/// Secret carrier key is too short to authenticate carried secrets.
	#[error("Secret carrier key must be at least {min} bytes.")]
	WeakCarrierKey {
		/// Minimum accepted key length.
		min: usize,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] ProviderDescriptorError),
}

/// Caller-supplied input failures detected before any network call.
#[derive(Debug, ThisError)]
pub enum ValidationError {
	/// One or more required fields are absent or empty.
	#[error("Missing required fields: {}.", .missing.join(", "))]
	MissingFields {
		/// Fields that were absent or empty.
		missing: Vec<&'static str>,
		/// Full list of fields the operation requires.
		required: &'static [&'static str],
	},
	/// Request body is not valid JSON for the operation.
	#[error("Request body is malformed.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A path identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
	/// An endpoint URL could not be rendered from its template.
	#[error("Endpoint `{endpoint}` produced an invalid URL.")]
	InvalidEndpointUrl {
		/// Endpoint name.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An endpoint template references a variable that was not supplied.
	#[error("Endpoint `{endpoint}` requires the `{variable}` path variable.")]
	MissingPathVariable {
		/// Endpoint name.
		endpoint: &'static str,
		/// Template variable name.
		variable: String,
	},
}

/// Signing failures; validated inputs should never produce these.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// Consumer key or secret is empty.
	#[error("Consumer credentials are required to sign a request.")]
	MissingConsumerCredentials,
	/// Target URL cannot be normalized into a signature base URI.
	#[error("URL cannot be signed: {reason}.")]
	UnsupportedUrl {
		/// Why the URL was rejected.
		reason: &'static str,
	},
	/// Caller attempted to supply a parameter the signer generates itself.
	#[error("Parameter `{name}` is generated by the signer and cannot be supplied.")]
	ReservedParameter {
		/// Offending parameter name.
		name: String,
	},
	/// HMAC key could not be initialized.
	#[error("Signing key is invalid.")]
	InvalidSigningKey,
}

/// Handshake-step failures.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Callback is missing a required parameter.
	#[error("Callback is missing the `{0}` parameter.")]
	MissingParameter(&'static str),
	/// Token endpoint answered with a non-success status or an unparseable body.
	#[error("Token exchange failed: {reason}.")]
	ExchangeFailed {
		/// HTTP status code, when a response was received.
		status: Option<u16>,
		/// Short description of what went wrong.
		reason: String,
		/// Raw response body.
		body: String,
	},
	/// Callback carries no request-token secret; restart from step 1.
	#[error("Request-token secret was not carried through the authorization redirect.")]
	LostSecret,
	/// Carried secret does not belong to the returned request token.
	#[error("Carried request-token secret does not match the issued request token.")]
	SecretMismatch,
	/// Callback returned a different request token than the one issued.
	#[error("Callback returned an unexpected request token.")]
	TokenMismatch,
	/// A handshake step was invoked out of sequence.
	#[error("Handshake step requires stage `{expected}` but the exchange is at `{actual}`.")]
	OutOfOrder {
		/// Stage the step requires.
		expected: FlowStage,
		/// Stage the exchange is actually in.
		actual: FlowStage,
	},
}
impl ProtocolError {
	fn http_status(&self) -> u16 {
		match self {
			ProtocolError::MissingParameter(_)
			| ProtocolError::LostSecret
			| ProtocolError::SecretMismatch
			| ProtocolError::TokenMismatch => 400,
			ProtocolError::OutOfOrder { .. } => 409,
			ProtocolError::ExchangeFailed { .. } => 500,
		}
	}
}

/// Provider-side failures on authenticated API calls.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Provider answered with a non-2xx status.
	#[error("Provider returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Provider body, parsed as JSON when possible and verbatim text otherwise.
		body: JsonValue,
	},
	/// Provider answered 2xx but the payload lacks the expected shape.
	#[error("Provider returned an unexpected `{endpoint}` payload.")]
	Malformed {
		/// Endpoint name.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The bounded per-request timeout elapsed.
	#[error("Request to the provider timed out.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
