//! Shared wire types for imgflow.
//!
//! The [`objects`] module mirrors the JSON shapes exchanged with the
//! execution service and with UI clients. The HTTP client lives behind the
//! `client` feature.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
