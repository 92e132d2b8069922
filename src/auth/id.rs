//! Strongly typed identifiers that end up inside provider URL paths.

// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let value = value.as_ref();

				validate($kind, value)?;

				Ok(Self(value.to_owned()))
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;
// Characters that would split or terminate a URL path segment.
const PATH_BREAKING: [char; 5] = ['/', '?', '#', '!', '%'];

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (provider, nickname, node).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (provider, nickname, node).
		kind: &'static str,
	},
	/// The identifier contains a character that would break the URL path.
	#[error("{kind} identifier contains the reserved character `{character}`.")]
	ReservedCharacter {
		/// Kind of identifier (provider, nickname, node).
		kind: &'static str,
		/// Offending character.
		character: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (provider, nickname, node).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { ProviderId, "Identifier for an OAuth 1.0a provider descriptor.", "Provider" }
def_id! { Nickname, "Account nickname the provider uses to address a user's resources.", "Nickname" }
def_id! { NodeId, "Provider-assigned identifier of a folder node.", "Node" }

fn validate(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if value.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if let Some(character) = value.chars().find(|ch| PATH_BREAKING.contains(ch)) {
		return Err(IdentifierError::ReservedCharacter { kind, character });
	}
	if value.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_path_breakers() {
		assert!(Nickname::new(" jdoe").is_err(), "Leading whitespace must be rejected.");
		assert!(Nickname::new("jdoe ").is_err(), "Trailing whitespace must be rejected.");
		assert!(Nickname::new("").is_err());
		assert_eq!(
			NodeId::new("abc/def").expect_err("Slashes must be rejected."),
			IdentifierError::ReservedCharacter { kind: "Node", character: '/' }
		);
		assert!(NodeId::new("a!folders").is_err());

		let nickname = Nickname::new("jdoe").expect("Nickname fixture should be valid.");

		assert_eq!(nickname.as_ref(), "jdoe");
		assert_eq!(format!("{nickname:?}"), "Nickname(jdoe)");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let node: NodeId =
			serde_json::from_str("\"Xb7Kq2\"").expect("Node identifier should deserialize.");

		assert_eq!(node.as_ref(), "Xb7Kq2");
		assert!(serde_json::from_str::<NodeId>("\"with space\"").is_err());
	}

	#[test]
	fn length_limits_are_enforced() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ProviderId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(ProviderId::new(&too_long).is_err());
	}
}
