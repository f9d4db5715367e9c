//! Info-RTU partner registry.
//!
//! The protocol is stateful: a session is opened with credentials, a
//! filter is attached to it, then the filtered project list is read back.
//! Every response body is wrapped in `{status, result}` and only
//! `status == "OK"` counts as success.

pub mod client;
pub mod types;

pub use client::{InfoRtuClient, RtuApiError, RtuCredentials};
pub use types::{RtuCoordinate, RtuExternalContact, RtuExternalProject, RtuFilter, RtuPlace, UnreadableField};
