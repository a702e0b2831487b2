//! Trait abstractions for dependency injection.
//!
//! The transport seam lives here; production and mock implementations
//! are in `crate::adapters`.

mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, RequestDescriptor, Response};
