//! HTTP clients for the services the RTU import talks to.
//!
//! - [`info_rtu`]: the partner registry's session-based project API.
//! - [`spatial`]: administrative boundary features.

pub mod info_rtu;
pub mod spatial;
