//! Typed entry point to the July list endpoints

use super::filters::{ListFilter, ResourceKind};
use super::models::Label;
use crate::cache::ResourceCache;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::{PageStrategy, Paginator};
use crate::transport::{Endpoint, EnvelopeDecoder, HttpListTransport, ListRequest, ListTransport};
use crate::types::{JsonValue, QueryParams};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds paginators for July resources and caches unpaginated lookups
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn ListTransport>,
    overrides: HashMap<ResourceKind, Arc<dyn ListTransport>>,
    strategy: Arc<dyn PageStrategy>,
    labels: ResourceCache<Option<String>, Vec<Label>>,
}

impl ApiClient {
    /// Create a client that talks HTTP to `config.base_url`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = Arc::new(HttpClient::new(config.http_client_config()?)?);
        let transport: Arc<dyn ListTransport> = Arc::new(HttpListTransport::new(
            Arc::clone(&http),
            EnvelopeDecoder::new(config.envelope.clone()),
        ));

        // Resources whose payload keeps items under another field get their own decoder
        let mut overrides: HashMap<ResourceKind, Arc<dyn ListTransport>> = HashMap::new();
        for kind in ResourceKind::ALL {
            let envelope = config.envelope_for(kind);
            if envelope != config.envelope {
                debug!("{} items read from '{}'", kind, envelope.items_field);
                overrides.insert(
                    kind,
                    Arc::new(HttpListTransport::new(
                        Arc::clone(&http),
                        EnvelopeDecoder::new(envelope),
                    )),
                );
            }
        }

        info!("API client ready for {}", config.base_url);
        Ok(Self {
            config: config.clone(),
            transport,
            overrides,
            strategy: config.pagination.build(),
            labels: ResourceCache::new(),
        })
    }

    /// Create a client over a custom transport
    ///
    /// The transport serves every resource; envelope settings in `config`
    /// are its concern.
    pub fn with_transport(transport: Arc<dyn ListTransport>, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            transport,
            overrides: HashMap::new(),
            strategy: config.pagination.build(),
            labels: ResourceCache::new(),
        })
    }

    /// The config this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Page size used for a resource
    pub fn page_size_for(&self, kind: ResourceKind) -> u32 {
        self.config.page_size_for(kind)
    }

    /// Paginator over the list a filter selects
    pub fn paginator<F: ListFilter>(&self, filter: &F) -> Result<Paginator<F::Item>> {
        self.build_paginator(F::KIND, filter.to_query()?)
    }

    /// Paginator yielding raw JSON items, for callers without a typed filter
    pub fn raw_paginator(&self, kind: ResourceKind, query: QueryParams) -> Result<Paginator<JsonValue>> {
        self.build_paginator(kind, query)
    }

    fn build_paginator<T>(&self, kind: ResourceKind, filter: QueryParams) -> Result<Paginator<T>> {
        if !kind.is_paginated() {
            return Err(Error::config(format!("Resource '{kind}' is not paginated")));
        }
        Paginator::builder(self.transport_for(kind), Endpoint::new(kind.path())?)
            .page_size(self.page_size_for(kind))
            .strategy(Arc::clone(&self.strategy))
            .policy(self.config.exhaustion_for(kind))
            .filter(filter)
            .build()
    }

    /// Labels, optionally those attached to one topic
    ///
    /// Fetched once per topic id and served from memory afterwards.
    pub async fn labels(&self, topic_id: Option<&str>) -> Result<Arc<Vec<Label>>> {
        let key = topic_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let fill_key = key.clone();
        self.labels
            .get_or_try_fill(key, move || async move {
                self.fetch_labels(fill_key.as_deref()).await
            })
            .await
    }

    async fn fetch_labels(&self, topic_id: Option<&str>) -> Result<Vec<Label>> {
        let mut query = QueryParams::new();
        if let Some(topic_id) = topic_id {
            query.insert("topic_id".to_string(), topic_id.to_string());
        }
        let request = ListRequest::new(ResourceKind::Label.path(), query);
        let page = self
            .transport_for(ResourceKind::Label)
            .fetch_page(&request)
            .await?;

        let labels = page
            .items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| Error::decode(format!("Label: {e}")))
            })
            .collect::<Result<Vec<Label>>>()?;
        debug!("Fetched {} labels from {}", labels.len(), request);
        Ok(labels)
    }

    fn transport_for(&self, kind: ResourceKind) -> Arc<dyn ListTransport> {
        self.overrides
            .get(&kind)
            .map_or_else(|| Arc::clone(&self.transport), Arc::clone)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("strategy", &self.strategy)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}
