//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FilterArgs, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pagination::PageSnapshot;
use crate::resources::{ApiClient, ResourceKind};
use crate::types::JsonValue;
use futures::StreamExt;
use serde_json::json;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch {
                resource,
                pages,
                page_size,
                filters,
            } => self.fetch(*resource, filters, *pages, *page_size).await,
            Commands::Labels { topic_id } => self.labels(topic_id.as_deref()).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load the config file (or defaults) and apply command-line overrides
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
            config.validate()?;
        }
        Ok(config)
    }

    /// Page through a resource, printing each page as it arrives
    async fn fetch(
        &self,
        kind: ResourceKind,
        filters: &FilterArgs,
        max_pages: Option<usize>,
        page_size: Option<u32>,
    ) -> Result<()> {
        if !kind.is_paginated() {
            return Err(Error::config(format!(
                "'{kind}' is not paginated, use the labels command"
            )));
        }

        let mut config = self.load_config()?;
        if let Some(page_size) = page_size {
            config.resources.entry(kind).or_default().page_size = Some(page_size);
            config.validate()?;
        }

        let client = ApiClient::from_config(&config)?;
        let paginator = client.raw_paginator(kind, filters.query_for(kind)?)?;
        info!(
            "Fetching {} from {} ({} per page)",
            kind,
            config.base_url,
            paginator.page_size()
        );

        let pages = paginator
            .stream()
            .take(max_pages.unwrap_or(usize::MAX));
        futures::pin_mut!(pages);

        let mut page = 0;
        let mut seen = 0;
        while let Some(snapshot) = pages.next().await {
            let snapshot = snapshot?;
            page += 1;
            self.output_page(kind, page, &snapshot.items[seen..], &snapshot);
            seen = snapshot.len();
        }

        info!(
            "Fetched {} {} items in {} pages{}",
            seen,
            kind,
            page,
            if paginator.has_more() { ", more available" } else { "" }
        );
        Ok(())
    }

    /// Print labels
    async fn labels(&self, topic_id: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let client = ApiClient::from_config(&config)?;
        let labels = client.labels(topic_id).await?;

        for label in labels.iter() {
            self.output_message(&json!({ "type": "LABEL", "label": label }));
        }
        info!("Fetched {} labels", labels.len());
        Ok(())
    }

    /// Validate the client configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let sizes: serde_json::Map<String, JsonValue> = ResourceKind::ALL
            .into_iter()
            .filter(|kind| kind.is_paginated())
            .map(|kind| (kind.to_string(), json!(config.page_size_for(kind))))
            .collect();

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Config for {} is valid", config.base_url),
                "page_sizes": sizes
            }
        }));
        Ok(())
    }

    /// Output one page: a header line, then its new items
    fn output_page(
        &self,
        kind: ResourceKind,
        page: usize,
        items: &[JsonValue],
        snapshot: &PageSnapshot<JsonValue>,
    ) {
        self.output_message(&json!({
            "type": "PAGE",
            "resource": kind,
            "page": page,
            "count": items.len(),
            "total": snapshot.len(),
            "has_more": snapshot.has_more,
        }));
        for item in items {
            self.output_message(&json!({ "type": "ITEM", "item": item }));
        }
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::try_parse_from(args.iter().copied()).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_zero_pages_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        runner(&["july-paging", "--base-url", &uri, "fetch", "topic", "--pages", "0"])
            .run()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_stops_at_page_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/topic"))
            .and(query_param("page", "1"))
            .and(query_param("size", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"items": [{"id": "A"}, {"id": "B"}]}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        runner(&[
            "july-paging",
            "--base-url",
            &uri,
            "fetch",
            "topic",
            "--pages",
            "1",
            "--page-size",
            "2",
        ])
        .run()
        .await
        .unwrap();
    }
}
