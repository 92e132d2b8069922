// self
use crate::_prelude::*;

/// HTTP methods used by the OAuth 1.0a handshake and the photo API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// Safe reads and user-agent redirects.
	Get,
	/// Token endpoints and resource creation.
	Post,
	/// Partial resource updates.
	Patch,
}
impl HttpMethod {
	/// Returns the upper-case method token used in signature base strings.
	pub fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Patch => "PATCH",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpMethod {
	type Err = UnsupportedMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("GET") {
			Ok(HttpMethod::Get)
		} else if s.eq_ignore_ascii_case("POST") {
			Ok(HttpMethod::Post)
		} else if s.eq_ignore_ascii_case("PATCH") {
			Ok(HttpMethod::Patch)
		} else {
			Err(UnsupportedMethod(s.to_owned()))
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<HttpMethod> for reqwest::Method {
	fn from(method: HttpMethod) -> Self {
		match method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
			HttpMethod::Patch => reqwest::Method::PATCH,
		}
	}
}

/// Error returned when parsing a method outside the supported set.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("HTTP method `{0}` is not supported.")]
pub struct UnsupportedMethod(pub String);

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parsing_is_case_insensitive_and_closed() {
		assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
		assert_eq!("GET".parse::<HttpMethod>(), Ok(HttpMethod::Get));
		assert!("DELETE".parse::<HttpMethod>().is_err());
		assert_eq!(HttpMethod::Post.to_string(), "POST");
	}
}
