//! HTTP transport

pub mod client;
pub mod request;

pub use client::{ClientOptions, HttpClient, Transport, DEFAULT_TOKEN_HEADER};
pub use request::{classify_response, ApiRequest};
