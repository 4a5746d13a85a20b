//! Transport module
//!
//! The paginator's only collaborator: something that turns a [`ListRequest`]
//! into a [`PageResponse`] or an error.
//!
//! # Overview
//!
//! - [`ListTransport`] - the async seam, implemented by [`HttpListTransport`]
//!   and by test doubles
//! - [`Endpoint`] - immutable resource locator with fixed query parameters
//! - [`EnvelopeDecoder`] - normalizes `{code, msg, data}` envelopes so the
//!   paginator only ever sees item arrays

mod envelope;
mod http;
mod types;

pub use envelope::{EnvelopeConfig, EnvelopeDecoder};
pub use http::HttpListTransport;
pub use types::{Endpoint, ListRequest, ListTransport, PageResponse};

#[cfg(test)]
mod tests;
