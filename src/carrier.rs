//! Secret carriers that move the request-token secret through the authorization redirect.
//!
//! The broker keeps no per-handshake state. Step 1 turns the request-token secret into a
//! carried string, the string rides on the redirect chain (cookie or client-threaded query
//! parameter), and the callback opens it again against the returned `oauth_token`.
//!
//! Neither carrier encrypts. The secret is readable by anyone who sees the carried value;
//! [`SealedCarrier`] only guarantees it was issued by this broker for that request token.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, RequestToken, TokenSecret},
	error::{ConfigError, ProtocolError},
};

type HmacSha256 = Hmac<Sha256>;

const SEALED_SEPARATOR: char = '.';
const KEY_DERIVATION_CONTEXT: &[u8] = b"oauth1-broker/secret-carrier/v1";

/// Shortest key accepted by [`SealedCarrier::new`].
pub const MIN_CARRIER_KEY_LEN: usize = 16;

/// Turns a request token into a carried value and back.
pub trait SecretCarrier
where
	Self: Send + Sync,
{
	/// Produces the value that travels with the redirect.
	fn seal(&self, token: &RequestToken) -> String;

	/// Recovers the secret for `oauth_token` from a carried value.
	fn open(&self, carried: &str, oauth_token: &str) -> Result<TokenSecret, ProtocolError>;
}

/// Carries the secret verbatim.
///
/// Any value is accepted on the way back, so a forged or swapped secret only fails later at
/// the access-token endpoint. Prefer [`SealedCarrier`] unless a client application already
/// depends on the raw value.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainCarrier;
impl SecretCarrier for PlainCarrier {
	fn seal(&self, token: &RequestToken) -> String {
		token.secret().expose().to_owned()
	}

	fn open(&self, carried: &str, _oauth_token: &str) -> Result<TokenSecret, ProtocolError> {
		if carried.is_empty() {
			return Err(ProtocolError::LostSecret);
		}

		Ok(TokenSecret::new(carried))
	}
}

/// Carries the secret with an HMAC-SHA256 tag bound to its request token.
///
/// The wire form is `b64url(secret).b64url(tag)` where the tag covers
/// `oauth_token || 0x00 || secret`. A value replayed against another request token, or
/// tampered with in transit, fails to open.
///
/// The secret itself is only encoded, not encrypted: the first segment decodes to it without
/// the key.
#[derive(Clone)]
pub struct SealedCarrier {
	mac: HmacSha256,
}
impl SealedCarrier {
	/// Builds a carrier keyed with `key`.
	pub fn new(key: &[u8]) -> Result<Self, ConfigError> {
		if key.len() < MIN_CARRIER_KEY_LEN {
			return Err(ConfigError::WeakCarrierKey { min: MIN_CARRIER_KEY_LEN });
		}

		let mac = HmacSha256::new_from_slice(key)
			.map_err(|_| ConfigError::WeakCarrierKey { min: MIN_CARRIER_KEY_LEN })?;

		Ok(Self { mac })
	}

	/// Derives the carrier key from the consumer secret.
	pub fn from_consumer(consumer: &CredentialPair) -> Result<Self, ConfigError> {
		if consumer.is_incomplete() {
			return Err(ConfigError::MissingConsumerCredentials);
		}

		let key = Sha256::new()
			.chain_update(KEY_DERIVATION_CONTEXT)
			.chain_update([0])
			.chain_update(consumer.secret.expose().as_bytes())
			.finalize();

		Self::new(&key)
	}

	fn tagged(&self, oauth_token: &str, secret: &str) -> HmacSha256 {
		let mut mac = self.mac.clone();

		mac.update(oauth_token.as_bytes());
		mac.update(&[0]);
		mac.update(secret.as_bytes());

		mac
	}
}
impl SecretCarrier for SealedCarrier {
	fn seal(&self, token: &RequestToken) -> String {
		let secret = token.secret().expose();
		let tag = self.tagged(token.key(), secret).finalize().into_bytes();

		format!(
			"{}{SEALED_SEPARATOR}{}",
			URL_SAFE_NO_PAD.encode(secret.as_bytes()),
			URL_SAFE_NO_PAD.encode(tag)
		)
	}

	fn open(&self, carried: &str, oauth_token: &str) -> Result<TokenSecret, ProtocolError> {
		if carried.is_empty() {
			return Err(ProtocolError::LostSecret);
		}

		let (secret, tag) =
			carried.split_once(SEALED_SEPARATOR).ok_or(ProtocolError::SecretMismatch)?;
		let secret = URL_SAFE_NO_PAD.decode(secret).map_err(|_| ProtocolError::SecretMismatch)?;
		let secret = String::from_utf8(secret).map_err(|_| ProtocolError::SecretMismatch)?;
		let tag = URL_SAFE_NO_PAD.decode(tag).map_err(|_| ProtocolError::SecretMismatch)?;

		self.tagged(oauth_token, &secret)
			.verify_slice(&tag)
			.map_err(|_| ProtocolError::SecretMismatch)?;

		Ok(TokenSecret::new(secret))
	}
}
impl Debug for SealedCarrier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("SealedCarrier(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request_token(key: &str, secret: &str) -> RequestToken {
		RequestToken::new(CredentialPair::new(key, secret))
	}

	fn carrier() -> SealedCarrier {
		SealedCarrier::from_consumer(&CredentialPair::new("ck", "cs"))
			.expect("Consumer fixture should derive a carrier key.")
	}

	#[test]
	fn sealed_values_open_for_their_own_token() {
		let carrier = carrier();
		let carried = carrier.seal(&request_token("RT1", "RTS1"));

		let (payload, _) = carried.split_once('.').expect("Sealed value has two parts.");

		assert_eq!(
			URL_SAFE_NO_PAD.decode(payload).expect("Payload is base64url."),
			b"RTS1",
			"Sealing authenticates the secret without encrypting it."
		);
		assert_eq!(
			carrier.open(&carried, "RT1").expect("Sealed value should open.").expose(),
			"RTS1"
		);
	}

	#[test]
	fn sealed_values_reject_foreign_tokens_and_tampering() {
		let carrier = carrier();
		let carried = carrier.seal(&request_token("RT1", "RTS1"));

		assert!(matches!(carrier.open(&carried, "RT2"), Err(ProtocolError::SecretMismatch)));

		let (_, tag) = carried.split_once('.').expect("Sealed value has two parts.");
		let forged = format!("{}.{tag}", URL_SAFE_NO_PAD.encode("other"));

		assert!(matches!(carrier.open(&forged, "RT1"), Err(ProtocolError::SecretMismatch)));
		assert!(matches!(carrier.open("garbage", "RT1"), Err(ProtocolError::SecretMismatch)));
		assert!(matches!(carrier.open("", "RT1"), Err(ProtocolError::LostSecret)));
	}

	#[test]
	fn carriers_keyed_differently_do_not_interoperate() {
		let carried = carrier().seal(&request_token("RT1", "RTS1"));
		let other = SealedCarrier::new(b"another-sixteen-byte-key").expect("Key is long enough.");

		assert!(other.open(&carried, "RT1").is_err());
		assert!(matches!(SealedCarrier::new(b"short"), Err(ConfigError::WeakCarrierKey { .. })));
	}

	#[test]
	fn plain_carrier_passes_the_secret_through() {
		let carried = PlainCarrier.seal(&request_token("RT1", "RTS1"));

		assert_eq!(carried, "RTS1");
		assert_eq!(PlainCarrier.open(&carried, "RT1").expect("Plain value opens.").expose(), "RTS1");
		assert!(matches!(PlainCarrier.open("", "RT1"), Err(ProtocolError::LostSecret)));
	}
}
