//! The lane API: query parameters and the HTTP client.

pub mod client;
pub mod filter;
