//! Provider-facing descriptors.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the three token
//! endpoints, the API base the authenticated calls target, and provider quirks such as the
//! HTTP method the access-token endpoint expects.

pub mod descriptor;

pub use descriptor::*;
