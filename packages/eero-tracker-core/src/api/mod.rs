//! HTTP layer for the eero cloud API.
//!
//! Every response is a JSON `{meta: {code, error?}, data: ...}` envelope;
//! the session token travels as a cookie named `s`.

mod client;

pub use client::{ApiClient, Transport, DEFAULT_API_URL};
