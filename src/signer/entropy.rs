//! Nonce and timestamp sources injected into the signer.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const NONCE_LEN: usize = 32;

/// Supplies the per-request `oauth_nonce` and `oauth_timestamp` values.
///
/// Nonce uniqueness relies on randomness plus the timestamp, so implementations need no
/// shared counter or locking.
pub trait Entropy
where
	Self: Send + Sync,
{
	/// Returns a fresh nonce.
	fn nonce(&self) -> String;

	/// Returns the current time in whole seconds since the Unix epoch.
	fn timestamp(&self) -> u64;
}

/// Production entropy backed by the thread-local RNG and the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEntropy;
impl Entropy for SystemEntropy {
	fn nonce(&self) -> String {
		rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
	}

	fn timestamp(&self) -> u64 {
		u64::try_from(OffsetDateTime::now_utc().unix_timestamp()).unwrap_or_default()
	}
}

/// Deterministic entropy for reproducible signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedEntropy {
	/// Nonce returned for every request.
	pub nonce: String,
	/// Timestamp returned for every request.
	pub timestamp: u64,
}
impl FixedEntropy {
	/// Pins both values.
	pub fn new(nonce: impl Into<String>, timestamp: u64) -> Self {
		Self { nonce: nonce.into(), timestamp }
	}
}
impl Entropy for FixedEntropy {
	fn nonce(&self) -> String {
		self.nonce.clone()
	}

	fn timestamp(&self) -> u64 {
		self.timestamp
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn system_nonces_are_alphanumeric_and_fresh() {
		let entropy = SystemEntropy;
		let first = entropy.nonce();
		let second = entropy.nonce();

		assert_eq!(first.len(), NONCE_LEN);
		assert!(first.chars().all(|ch| ch.is_ascii_alphanumeric()));
		assert_ne!(first, second);
		assert!(entropy.timestamp() > 1_700_000_000);
	}
}
