//! OAuth 1.0a HMAC-SHA1 request signer.
//!
//! [`Signer`] owns the process-wide consumer credentials and turns a [`SignableRequest`] plus
//! an optional token pair into an [`AuthorizationHeader`]. Nonce and timestamp come from an
//! injected [`Entropy`] source, so pinning them with [`FixedEntropy`] makes signatures fully
//! reproducible. Signing must be the last step before transmission: any change to the method,
//! URL, parameters, or credentials invalidates the header.

pub mod base;
pub mod encode;
pub mod entropy;

pub use base::*;
pub use encode::*;
pub use entropy::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	error::SigningError,
	provider::HttpMethod,
};

type HmacSha1 = Hmac<Sha1>;

/// Signature method advertised in every header.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// Protocol version advertised in every header.
pub const OAUTH_VERSION: &str = "1.0";

const OAUTH_PREFIX: &str = "oauth_";
const GENERATED_PARAMETERS: [&str; 7] = [
	"oauth_consumer_key",
	"oauth_nonce",
	"oauth_signature",
	"oauth_signature_method",
	"oauth_timestamp",
	"oauth_token",
	"oauth_version",
];

/// Transient description of the request being signed.
///
/// Parameters prefixed with `oauth_` (such as `oauth_callback` or `oauth_verifier`) are signed
/// and emitted in the header; every other parameter is signed and must be transmitted by the
/// caller as a form body. JSON bodies never participate in the signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignableRequest {
	method: HttpMethod,
	url: Url,
	params: Vec<(String, String)>,
}
impl SignableRequest {
	/// Starts a request description without parameters.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, params: Vec::new() }
	}

	/// Appends one signed parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));

		self
	}

	/// Appends several signed parameters in order.
	pub fn params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.params.extend(params.into_iter().map(|(key, value)| (key.into(), value.into())));

		self
	}

	/// HTTP method.
	pub fn method(&self) -> HttpMethod {
		self.method
	}

	/// Target URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Caller-supplied parameters in insertion order.
	pub fn parameters(&self) -> &[(String, String)] {
		&self.params
	}

	/// Parameters that travel outside the header (form body fields).
	pub fn form_parameters(&self) -> impl Iterator<Item = &(String, String)> {
		self.params.iter().filter(|(key, _)| !key.starts_with(OAUTH_PREFIX))
	}
}

/// Protocol parameters generated for a single request, in header order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthParameters {
	/// `oauth_consumer_key`.
	pub consumer_key: String,
	/// `oauth_nonce`.
	pub nonce: String,
	/// `oauth_timestamp`.
	pub timestamp: u64,
	/// `oauth_token`, absent for consumer-only requests.
	pub token: Option<String>,
	/// Extra protocol parameters supplied by the caller (`oauth_callback`, `oauth_verifier`).
	pub extra: Vec<(String, String)>,
	/// `oauth_signature`, populated once the request is signed.
	pub signature: Option<String>,
}
impl OAuthParameters {
	fn unsigned_pairs(&self) -> Vec<(String, String)> {
		let mut pairs = vec![
			("oauth_consumer_key".to_owned(), self.consumer_key.clone()),
			("oauth_nonce".to_owned(), self.nonce.clone()),
			("oauth_signature_method".to_owned(), SIGNATURE_METHOD.to_owned()),
			("oauth_timestamp".to_owned(), self.timestamp.to_string()),
		];

		if let Some(token) = &self.token {
			pairs.push(("oauth_token".to_owned(), token.clone()));
		}

		pairs.push(("oauth_version".to_owned(), OAUTH_VERSION.to_owned()));
		pairs.extend(self.extra.iter().cloned());

		pairs
	}

	/// Renders the `Authorization` header; parameters keep generation order.
	fn into_header(self) -> AuthorizationHeader {
		let mut pairs = self.unsigned_pairs();

		if let Some(signature) = self.signature {
			pairs.push(("oauth_signature".to_owned(), signature));
		}

		let value = format!(
			"OAuth {}",
			pairs
				.iter()
				.map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
				.collect::<Vec<_>>()
				.join(", ")
		);

		AuthorizationHeader { value, params: pairs }
	}
}

/// Fully rendered `Authorization: OAuth ...` header value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationHeader {
	value: String,
	params: Vec<(String, String)>,
}
impl AuthorizationHeader {
	/// Header value, starting with `OAuth `.
	pub fn as_str(&self) -> &str {
		&self.value
	}

	/// Looks up the decoded value of a header parameter.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Base64 HMAC-SHA1 signature.
	pub fn signature(&self) -> Option<&str> {
		self.get("oauth_signature")
	}

	/// Decoded parameters in header order.
	pub fn parameters(&self) -> &[(String, String)] {
		&self.params
	}
}
impl AsRef<str> for AuthorizationHeader {
	fn as_ref(&self) -> &str {
		&self.value
	}
}
impl Display for AuthorizationHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.value)
	}
}

/// HMAC-SHA1 signer bound to the process-wide consumer credentials.
#[derive(Clone)]
pub struct Signer {
	consumer: CredentialPair,
	entropy: Arc<dyn Entropy>,
}
impl Signer {
	/// Creates a signer that draws nonces and timestamps from [`SystemEntropy`].
	pub fn new(consumer: CredentialPair) -> Self {
		Self { consumer, entropy: Arc::new(SystemEntropy) }
	}

	/// Replaces the nonce/timestamp source.
	pub fn with_entropy(mut self, entropy: impl 'static + Entropy) -> Self {
		self.entropy = Arc::new(entropy);

		self
	}

	/// Consumer key the signer advertises.
	pub fn consumer_key(&self) -> &str {
		&self.consumer.key
	}

	/// Signs `request` with a fresh nonce and the current timestamp.
	///
	/// `token` is `None` for consumer-only requests (step 1) and the request or access token
	/// pair otherwise. An empty token secret is valid and yields `consumer_secret&`.
	pub fn sign(
		&self,
		request: &SignableRequest,
		token: Option<&CredentialPair>,
	) -> Result<AuthorizationHeader, SigningError> {
		self.sign_with(request, token, self.entropy.nonce(), self.entropy.timestamp())
	}

	/// Signs `request` with an explicit nonce and timestamp.
	pub fn sign_with(
		&self,
		request: &SignableRequest,
		token: Option<&CredentialPair>,
		nonce: String,
		timestamp: u64,
	) -> Result<AuthorizationHeader, SigningError> {
		if self.consumer.is_incomplete() {
			return Err(SigningError::MissingConsumerCredentials);
		}

		let mut extra = Vec::new();
		let mut form = Vec::new();

		for (key, value) in request.parameters() {
			if GENERATED_PARAMETERS.contains(&key.as_str()) {
				return Err(SigningError::ReservedParameter { name: key.clone() });
			}
			if key.starts_with(OAUTH_PREFIX) {
				extra.push((key.clone(), value.clone()));
			} else {
				form.push((key.clone(), value.clone()));
			}
		}

		let mut oauth = OAuthParameters {
			consumer_key: self.consumer.key.clone(),
			nonce,
			timestamp,
			token: token.map(|pair| pair.key.clone()),
			extra,
			signature: None,
		};
		let mut signed = oauth.unsigned_pairs();

		signed.extend(form);

		let base = signature_base_string(request.method(), request.url(), &signed)?;
		let key = signing_key(&self.consumer.secret, token.map(|pair| &pair.secret));

		oauth.signature = Some(hmac_sha1_base64(&key, &base)?);

		Ok(oauth.into_header())
	}
}
impl Debug for Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Signer").field("consumer", &self.consumer).finish_non_exhaustive()
	}
}

/// Builds `enc(consumer_secret)&enc(token_secret or "")`.
pub fn signing_key(consumer_secret: &TokenSecret, token_secret: Option<&TokenSecret>) -> String {
	format!(
		"{}&{}",
		percent_encode(consumer_secret.expose()),
		token_secret.map(|secret| percent_encode(secret.expose())).unwrap_or_default()
	)
}

fn hmac_sha1_base64(key: &str, base: &str) -> Result<String, SigningError> {
	let mut mac =
		HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| SigningError::InvalidSigningKey)?;

	mac.update(base.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const SCENARIO_BASE: &str = "GET&https%3A%2F%2Fapi.example.com%2Fres&oauth_consumer_key%3Dck%26oauth_nonce%3Dabc123%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1700000000%26oauth_version%3D1.0";

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse signer fixture URL.")
	}

	fn fixed_signer(key: &str, secret: &str) -> Signer {
		Signer::new(CredentialPair::new(key, secret))
			.with_entropy(FixedEntropy::new("abc123", 1_700_000_000))
	}

	fn reference_signature(key: &str, base: &str) -> String {
		let mut mac =
			HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length.");

		mac.update(base.as_bytes());

		STANDARD.encode(mac.finalize().into_bytes())
	}

	#[test]
	fn consumer_only_get_matches_the_documented_base_string() {
		let signer = fixed_signer("ck", "cs");
		let request = SignableRequest::new(HttpMethod::Get, url("https://api.example.com/res"));
		let header = signer.sign(&request, None).expect("Consumer-only request should sign.");

		assert!(header.as_str().starts_with("OAuth "));
		assert!(header.as_str().contains("oauth_consumer_key=\"ck\""));
		assert!(header.as_str().contains("oauth_signature_method=\"HMAC-SHA1\""));
		assert!(header.as_str().contains("oauth_nonce=\"abc123\""));
		assert!(header.as_str().contains("oauth_timestamp=\"1700000000\""));
		assert!(header.as_str().contains("oauth_version=\"1.0\""));
		assert!(!header.as_str().contains("oauth_token="));
		assert_eq!(header.signature(), Some(reference_signature("cs&", SCENARIO_BASE).as_str()));
	}

	#[test]
	fn matches_the_published_twitter_reference_vector() {
		let signer = Signer::new(CredentialPair::new(
			"xvz1evFS4wEEPTGEFPHBog",
			"kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
		));
		let token = CredentialPair::new(
			"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
			"LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
		);
		let request = SignableRequest::new(
			HttpMethod::Post,
			url("https://api.twitter.com/1.1/statuses/update.json?include_entities=true"),
		)
		.param("status", "Hello Ladies + Gentlemen, a signed OAuth request!");
		let header = signer
			.sign_with(
				&request,
				Some(&token),
				"kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".into(),
				1_318_622_958,
			)
			.expect("Reference request should sign.");

		assert_eq!(header.signature(), Some("hCtSmYh+iHYCEqBWrE7C7hYmtUk="));
		assert!(header.as_str().contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
		assert!(!header.as_str().contains("status="), "Form parameters stay out of the header.");
	}

	#[test]
	fn identical_inputs_sign_identically() {
		let signer = fixed_signer("ck", "cs");
		let token = CredentialPair::new("tk", "ts");
		let request = SignableRequest::new(HttpMethod::Post, url("https://api.example.com/res"))
			.param("oauth_verifier", "v1");
		let first = signer.sign(&request, Some(&token)).expect("Request should sign.");
		let second = signer.sign(&request, Some(&token)).expect("Request should sign.");

		assert_eq!(first, second);
		assert_eq!(first.get("oauth_verifier"), Some("v1"));
		assert_eq!(first.get("oauth_token"), Some("tk"));
	}

	#[test]
	fn single_byte_mutations_change_the_signature() {
		let signer = fixed_signer("ck", "cs");
		let token = CredentialPair::new("tk", "ts");
		let sign = |method: HttpMethod, target: &str, value: &str, token: &CredentialPair| {
			let request = SignableRequest::new(method, url(target)).param("name", value);

			signer
				.sign(&request, Some(token))
				.expect("Mutation fixture should sign.")
				.signature()
				.map(str::to_owned)
		};
		let baseline = sign(HttpMethod::Post, "https://api.example.com/res", "value", &token);

		assert_ne!(baseline, sign(HttpMethod::Patch, "https://api.example.com/res", "value", &token));
		assert_ne!(baseline, sign(HttpMethod::Post, "https://api.example.com/reS", "value", &token));
		assert_ne!(baseline, sign(HttpMethod::Post, "https://api.example.com/res", "valuf", &token));
		assert_ne!(
			baseline,
			sign(
				HttpMethod::Post,
				"https://api.example.com/res",
				"value",
				&CredentialPair::new("tk", "tt")
			)
		);
	}

	#[test]
	fn empty_token_secret_still_signs() {
		let signer = fixed_signer("ck", "cs");
		let token = CredentialPair::new("tk", "");
		let request = SignableRequest::new(HttpMethod::Get, url("https://api.example.com/res"));
		let header = signer.sign(&request, Some(&token)).expect("Empty token secret is legal.");
		let base = signature_base_string(
			HttpMethod::Get,
			request.url(),
			&[
				("oauth_consumer_key".into(), "ck".into()),
				("oauth_nonce".into(), "abc123".into()),
				("oauth_signature_method".into(), "HMAC-SHA1".into()),
				("oauth_timestamp".into(), "1700000000".into()),
				("oauth_token".into(), "tk".into()),
				("oauth_version".into(), "1.0".into()),
			],
		)
		.expect("Base string should build.");

		assert_eq!(header.signature(), Some(reference_signature("cs&", &base).as_str()));
	}

	#[test]
	fn missing_consumer_credentials_fail_instead_of_defaulting() {
		let request = SignableRequest::new(HttpMethod::Get, url("https://api.example.com/res"));
		let err = fixed_signer("ck", "")
			.sign(&request, None)
			.expect_err("An empty consumer secret must not sign.");

		assert!(matches!(err, SigningError::MissingConsumerCredentials));
		assert!(fixed_signer("", "cs").sign(&request, None).is_err());
	}

	#[test]
	fn generated_parameters_cannot_be_overridden() {
		let request = SignableRequest::new(HttpMethod::Get, url("https://api.example.com/res"))
			.param("oauth_nonce", "attacker");
		let err = fixed_signer("ck", "cs")
			.sign(&request, None)
			.expect_err("Generated parameters are reserved.");

		assert!(matches!(err, SigningError::ReservedParameter { name } if name == "oauth_nonce"));
	}

	#[test]
	fn signing_key_encodes_both_halves() {
		let key = signing_key(&TokenSecret::new("c&s"), Some(&TokenSecret::new("t s")));

		assert_eq!(key, "c%26s&t%20s");
		assert_eq!(signing_key(&TokenSecret::new("cs"), None), "cs&");
	}
}
