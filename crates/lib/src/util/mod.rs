//! Shared utilities.
//!
//! Common utilities used across the crate including the HTTP client and test
//! helpers.

pub mod http;

#[cfg(test)]
pub mod testutil;
