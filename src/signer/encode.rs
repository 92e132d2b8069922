//! RFC 3986 percent-encoding as OAuth 1.0a requires it.

// std
use std::{borrow::Cow, str::Utf8Error};
// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

// Everything except the unreserved set `A-Z a-z 0-9 - . _ ~`.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `value` with upper-case hex digits, leaving only unreserved characters.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Reverses [`percent_encode`].
pub fn percent_decode(value: &str) -> Result<String, Utf8Error> {
	percent_decode_str(value).decode_utf8().map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn encodes_everything_outside_the_unreserved_set() {
		assert_eq!(percent_encode("AZaz09-._~"), "AZaz09-._~");
		assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
		assert_eq!(percent_encode("a!*'()"), "a%21%2A%27%28%29");
		assert_eq!(percent_encode("https://x/y?z=1"), "https%3A%2F%2Fx%2Fy%3Fz%3D1");
		assert_eq!(percent_encode("☃"), "%E2%98%83");
	}

	#[test]
	fn round_trips_arbitrary_values() {
		let samples = [
			"",
			"plain",
			"Hello Ladies + Gentlemen, a signed OAuth request!",
			"%41 already-looking encoded",
			"ünïcödé ✓ 🚀",
			"a=b&c=d;e/f?g#h",
			"\u{0}\u{7f}\t\n",
		];

		for sample in samples {
			let encoded = percent_encode(sample);

			assert_eq!(percent_decode(&encoded).expect("Encoded value should decode."), sample);
		}
	}
}
