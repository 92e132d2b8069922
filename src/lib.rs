//! OAuth 1.0a broker for photo-hosting APIs: HMAC-SHA1 request signing, stateless three-legged
//! handshakes that carry the request-token secret across the authorization redirect, and signed
//! API calls driven by declarative endpoint descriptors.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod carrier;
pub mod config;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod provider;
#[cfg(feature = "server")] pub mod server;
pub mod signer;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)]
use {
	color_eyre as _, dotenvy as _, httpmock as _, tokio as _, tower as _, tracing_subscriber as _,
};
