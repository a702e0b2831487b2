//! Adapter implementations of the trait abstractions.
//!
//! Production adapters wrap real libraries (reqwest); mock adapters
//! provide scripted behavior for tests.

pub mod mock;
mod reqwest_http;

pub use reqwest_http::ReqwestHttpClient;
