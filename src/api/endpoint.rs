//! Declarative endpoint descriptors for the photo API.

// self
use crate::{_prelude::*, error::ValidationError, provider::HttpMethod};

/// Path variable holding the account nickname.
pub const NICKNAME_VAR: &str = "nickname";
/// Path variable holding a folder node identifier.
pub const FOLDER_ID_VAR: &str = "folder_id";

/// Resolves the authenticated user (`!authuser`).
pub const AUTH_USER: EndpointDescriptor =
	EndpointDescriptor::new("authuser", HttpMethod::Get, "/api/v2!authuser");
/// Creates a folder under the user's root folder.
pub const CREATE_FOLDER: EndpointDescriptor = EndpointDescriptor::new(
	"create_folder",
	HttpMethod::Post,
	"/api/v2/folder/user/{nickname}!folderroot",
);
/// Lists the user's top-level folders.
pub const LIST_FOLDERS: EndpointDescriptor = EndpointDescriptor::new(
	"list_folders",
	HttpMethod::Get,
	"/api/v2/folder/user/{nickname}!folders",
);
/// Renames a folder.
pub const UPDATE_FOLDER: EndpointDescriptor = EndpointDescriptor::new(
	"update_folder",
	HttpMethod::Patch,
	"/api/v2/folder/user/{nickname}/{folder_id}",
);

/// One API operation: method plus a path template with `{variable}` placeholders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
	/// Stable name used in errors and spans.
	pub name: &'static str,
	/// HTTP method.
	pub method: HttpMethod,
	/// Path template relative to the API base.
	pub path: &'static str,
}
impl EndpointDescriptor {
	/// Declares an endpoint.
	pub const fn new(name: &'static str, method: HttpMethod, path: &'static str) -> Self {
		Self { name, method, path }
	}

	/// Returns true when the path embeds the account nickname.
	pub fn needs_nickname(&self) -> bool {
		self.path.contains("{nickname}")
	}

	/// Substitutes `vars` into the template and joins it onto `base`.
	///
	/// Variables are expected to be validated identifiers; the base URL's own path is kept
	/// as a prefix.
	pub fn render(&self, base: &Url, vars: &[(&str, &str)]) -> Result<Url, ValidationError> {
		let mut path = String::with_capacity(self.path.len());
		let mut rest = self.path;

		while let Some(open) = rest.find('{') {
			let close = rest[open..]
				.find('}')
				.map(|offset| open + offset)
				.ok_or_else(|| self.missing(&rest[open..]))?;
			let variable = &rest[open + 1..close];
			let value = vars
				.iter()
				.find(|(name, _)| *name == variable)
				.map(|(_, value)| *value)
				.ok_or_else(|| self.missing(variable))?;

			path.push_str(&rest[..open]);
			path.push_str(value);

			rest = &rest[close + 1..];
		}

		path.push_str(rest);

		Url::parse(&format!("{}{path}", base.as_str().trim_end_matches('/')))
			.map_err(|source| ValidationError::InvalidEndpointUrl { endpoint: self.name, source })
	}

	fn missing(&self, variable: &str) -> ValidationError {
		ValidationError::MissingPathVariable { endpoint: self.name, variable: variable.to_owned() }
	}
}
