//! Template fetching from remote sources.
//!
//! Archives and registry documents are fetched over HTTP; there is no git
//! transport.

pub mod http;

pub use http::{bearer_header, normalize_headers, FetchResponse, Headers, HttpFetcher};
