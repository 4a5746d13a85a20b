//! HTTP-backed list transport

use super::envelope::EnvelopeDecoder;
use super::types::{ListRequest, ListTransport, PageResponse};
use crate::error::Result;
use crate::http::HttpClient;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Fetches pages with GET requests and normalizes the backend envelope
#[derive(Debug, Clone)]
pub struct HttpListTransport {
    client: Arc<HttpClient>,
    decoder: EnvelopeDecoder,
}

impl HttpListTransport {
    /// Create a transport over a shared HTTP client
    pub fn new(client: Arc<HttpClient>, decoder: EnvelopeDecoder) -> Self {
        Self { client, decoder }
    }
}

#[async_trait]
impl ListTransport for HttpListTransport {
    async fn fetch_page(&self, request: &ListRequest) -> Result<PageResponse> {
        let body = self.client.get_text(&request.path, &request.query).await?;
        let page = self.decoder.decode(&body)?;
        debug!(
            "GET {} returned {} items (has_next: {:?})",
            request,
            page.len(),
            page.has_next
        );
        Ok(page)
    }
}
