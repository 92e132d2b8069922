//! Shared helpers for handshake steps (token response parsing, callback confirmation).

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::CredentialPair, error::ProtocolError, http::ProviderResponse};

/// Parses an `application/x-www-form-urlencoded` token response body into a credential pair.
///
/// Both `oauth_token` and `oauth_token_secret` must be present and `oauth_token` must be
/// non-empty.
pub fn parse_credentials(body: &str) -> Result<CredentialPair, ProtocolError> {
	credentials_from(&parse_form(body), None, body)
}

/// Decodes a form body; the first occurrence of a key wins.
pub fn parse_form(body: &str) -> BTreeMap<String, String> {
	let mut fields = BTreeMap::new();

	for (key, value) in form_urlencoded::parse(body.trim().as_bytes()) {
		fields.entry(key.into_owned()).or_insert_with(|| value.into_owned());
	}

	fields
}

pub(crate) fn token_fields(
	response: &ProviderResponse,
) -> Result<BTreeMap<String, String>, ProtocolError> {
	if !response.is_success() {
		return Err(ProtocolError::ExchangeFailed {
			status: Some(response.status),
			reason: format!("provider answered HTTP {}", response.status),
			body: response.text(),
		});
	}

	Ok(parse_form(&response.text()))
}

pub(crate) fn credentials_from(
	fields: &BTreeMap<String, String>,
	status: Option<u16>,
	body: &str,
) -> Result<CredentialPair, ProtocolError> {
	let failed = |reason: &str| ProtocolError::ExchangeFailed {
		status,
		reason: reason.to_owned(),
		body: body.to_owned(),
	};
	let token = fields
		.get("oauth_token")
		.filter(|token| !token.is_empty())
		.ok_or_else(|| failed("response lacks oauth_token"))?;
	let secret =
		fields.get("oauth_token_secret").ok_or_else(|| failed("response lacks oauth_token_secret"))?;

	Ok(CredentialPair::new(token.as_str(), secret.as_str()))
}

/// Rejects a step 1 response that explicitly declines the callback.
///
/// When `required` is set the flag must also be present.
pub(crate) fn ensure_callback_confirmed(
	fields: &BTreeMap<String, String>,
	required: bool,
	status: Option<u16>,
	body: &str,
) -> Result<(), ProtocolError> {
	match fields.get("oauth_callback_confirmed").map(String::as_str) {
		Some("true") => Ok(()),
		None if !required => Ok(()),
		_ => Err(ProtocolError::ExchangeFailed {
			status,
			reason: "provider did not confirm the callback".into(),
			body: body.to_owned(),
		}),
	}
}
