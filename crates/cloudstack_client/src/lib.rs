//! Client for the CloudStack HTTP API
//!
//! Requests are signed with the account's secret key (HMAC-SHA1 over the
//! sorted, lowercased query string) and decoded from CloudStack's JSON
//! envelopes.

pub mod client;
pub mod signing;

pub use client::*;
