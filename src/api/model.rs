//! Request and response payloads for the photo API.

// crates.io
use serde::{Deserializer, de::DeserializeOwned};
// self
use crate::{_prelude::*, auth::Nickname, error::UpstreamError};

/// Status and JSON body of a successful API call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiResponse {
	/// HTTP status code (2xx).
	pub status: u16,
	/// Response body; `null` when empty, a JSON string when the body is not JSON.
	pub body: JsonValue,
}

/// Authenticated account as reported by `!authuser`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserInfo {
	/// Account nickname used in folder paths.
	pub nickname: Nickname,
	/// Unmodified provider response.
	pub raw: JsonValue,
}

/// Folder list returned by `!folders`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FolderListing {
	/// Folders in provider order.
	pub folders: Vec<FolderSummary>,
	/// Unmodified provider response.
	pub raw: JsonValue,
}

/// Flattened view of a provider folder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub struct FolderSummary {
	/// Node identifier used when updating the folder.
	#[serde(rename(serialize = "id", deserialize = "NodeID"))]
	pub id: String,
	/// Display name.
	pub name: String,
	/// URL slug.
	#[serde(default)]
	pub url_name: Option<String>,
	/// Description, empty when unset.
	#[serde(default, deserialize_with = "null_as_default")]
	pub description: String,
	/// Creation timestamp as reported by the provider.
	#[serde(default)]
	pub date_created: Option<String>,
	/// Modification timestamp as reported by the provider.
	#[serde(default)]
	pub date_modified: Option<String>,
	/// Privacy level.
	#[serde(default)]
	pub privacy: Option<String>,
	/// Security type.
	#[serde(default)]
	pub security_type: Option<String>,
	/// Number of child folders.
	#[serde(default, deserialize_with = "null_as_default")]
	pub folder_count: u64,
	/// Number of albums.
	#[serde(default, deserialize_with = "null_as_default")]
	pub album_count: u64,
	/// Whether the folder has children.
	#[serde(default, deserialize_with = "null_as_default")]
	pub has_children: bool,
	/// Canonical resource URI.
	#[serde(default)]
	pub uri: Option<String>,
	/// Related resource URIs.
	#[serde(default)]
	pub uris: JsonValue,
}

/// JSON body for creating or renaming a folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FolderChange {
	/// Display name.
	pub name: String,
	/// URL slug.
	pub url_name: String,
}
impl FolderChange {
	/// Body for a new folder; the slug is lower-cased with whitespace runs replaced by `-`.
	pub fn create(name: impl Into<String>) -> Self {
		let name = name.into();
		let url_name = slug(&name);

		Self { name, url_name }
	}

	/// Body for a rename; the slug is the name with all whitespace removed.
	pub fn rename(name: impl Into<String>) -> Self {
		let name = name.into();
		let url_name = name.chars().filter(|ch| !ch.is_whitespace()).collect();

		Self { name, url_name }
	}
}
impl From<FolderChange> for JsonValue {
	fn from(change: FolderChange) -> Self {
		serde_json::json!({ "Name": change.name, "UrlName": change.url_name })
	}
}

#[derive(Deserialize)]
struct AuthUserEnvelope {
	#[serde(rename = "Response")]
	response: AuthUserResponse,
}
#[derive(Deserialize)]
struct AuthUserResponse {
	#[serde(rename = "User")]
	user: AuthUser,
}
#[derive(Deserialize)]
struct AuthUser {
	#[serde(rename = "NickName")]
	nickname: Nickname,
}

#[derive(Deserialize)]
struct FolderEnvelope {
	#[serde(rename = "Response", default, deserialize_with = "null_as_default")]
	response: FolderPage,
}
#[derive(Default, Deserialize)]
struct FolderPage {
	#[serde(rename = "Folder", default, deserialize_with = "null_as_default")]
	folders: Vec<FolderSummary>,
}

pub(crate) fn decode_user_info(endpoint: &'static str, raw: JsonValue) -> Result<UserInfo> {
	let envelope: AuthUserEnvelope = decode(endpoint, &raw)?;

	Ok(UserInfo { nickname: envelope.response.user.nickname, raw })
}

pub(crate) fn decode_folder_listing(endpoint: &'static str, raw: JsonValue) -> Result<FolderListing> {
	let envelope: FolderEnvelope = decode(endpoint, &raw)?;

	Ok(FolderListing { folders: envelope.response.folders, raw })
}

fn decode<T>(endpoint: &'static str, value: &JsonValue) -> Result<T, UpstreamError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value)
		.map_err(|source| UpstreamError::Malformed { endpoint, source })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn slug(name: &str) -> String {
	let mut slug = String::with_capacity(name.len());
	let mut in_whitespace = false;

	for ch in name.chars() {
		if ch.is_whitespace() {
			if !in_whitespace {
				slug.push('-');
			}

			in_whitespace = true;
		} else {
			slug.extend(ch.to_lowercase());

			in_whitespace = false;
		}
	}

	slug
}
