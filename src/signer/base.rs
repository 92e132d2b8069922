//! Signature base string construction (RFC 5849 §3.4.1).

// self
use crate::{
	_prelude::*,
	error::SigningError,
	provider::HttpMethod,
	signer::encode::percent_encode,
};

/// Normalizes `url` into the base string URI: scheme, host, non-default port, and path.
///
/// The query is excluded here; its pairs join the parameter set instead.
pub fn base_string_uri(url: &Url) -> Result<String, SigningError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(SigningError::UnsupportedUrl { reason: "scheme must be http or https" });
	}
	if url.fragment().is_some() {
		return Err(SigningError::UnsupportedUrl { reason: "URL must not contain a fragment" });
	}

	let host = url.host_str().ok_or(SigningError::UnsupportedUrl { reason: "URL has no host" })?;
	let mut uri = format!("{}://{}", url.scheme(), host.to_ascii_lowercase());

	// `Url::port` already omits the scheme's default port.
	if let Some(port) = url.port() {
		uri.push(':');
		uri.push_str(&port.to_string());
	}

	uri.push_str(url.path());

	Ok(uri)
}

/// Encodes, sorts, and joins parameters into the normalized parameter string.
///
/// Pairs sort by encoded key, then encoded value; the sort is stable so exact duplicates keep
/// their original order.
pub fn normalize_parameters<'a, I>(params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut encoded = params
		.into_iter()
		.map(|(key, value)| (percent_encode(key), percent_encode(value)))
		.collect::<Vec<_>>();

	encoded.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

	encoded.into_iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&")
}

/// Builds `METHOD&enc(base URI)&enc(parameter string)` for a request.
///
/// `params` holds the protocol parameters (minus `oauth_signature`) and any form parameters;
/// the URL's own query pairs are merged in here.
pub fn signature_base_string(
	method: HttpMethod,
	url: &Url,
	params: &[(String, String)],
) -> Result<String, SigningError> {
	let uri = base_string_uri(url)?;
	let query = url.query_pairs().into_owned().collect::<Vec<_>>();
	let normalized = normalize_parameters(
		params
			.iter()
			.chain(query.iter())
			.map(|(key, value)| (key.as_str(), value.as_str())),
	);

	Ok(format!("{}&{}&{}", method.as_str(), percent_encode(&uri), percent_encode(&normalized)))
}
