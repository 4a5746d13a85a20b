//! Client configuration
//!
//! Everything the client needs to reach the July backend, loaded from YAML.
//! Every field has a default, so an empty document is a valid config.
//!
//! ```yaml
//! base_url: https://july.example.com/v2
//! page_size: 10
//! pagination:
//!   style: page_number
//! http:
//!   timeout_secs: 15
//!   max_retries: 2
//! resources:
//!   knowledge:
//!     page_size: 16
//! ```

use crate::error::{Error, Result};
use crate::http::{default_user_agent, HttpClientConfig, RateLimiterConfig, RetryPolicy};
use crate::pagination::{ExhaustionPolicy, PaginationConfig, DEFAULT_PAGE_SIZE};
use crate::resources::ResourceKind;
use crate::transport::EnvelopeConfig;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the REST API; resource paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Items per page for resources without their own size
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Wire parameters of the page cursor
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// How the end of a list is detected
    #[serde(default)]
    pub exhaustion: ExhaustionPolicy,

    /// Response envelope layout
    #[serde(default)]
    pub envelope: EnvelopeConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-resource overrides
    #[serde(default)]
    pub resources: BTreeMap<ResourceKind, ResourceConfig>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/v2".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            pagination: PaginationConfig::default(),
            exhaustion: ExhaustionPolicy::default(),
            envelope: EnvelopeConfig::default(),
            http: HttpConfig::default(),
            resources: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values the client cannot use
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }

        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }

        for (kind, resource) in &self.resources {
            if resource.page_size == Some(0) {
                return Err(Error::invalid_value(
                    format!("resources.{kind}.page_size"),
                    "must be at least 1",
                ));
            }
            if resource.items_field.as_deref().is_some_and(str::is_empty) {
                return Err(Error::invalid_value(
                    format!("resources.{kind}.items_field"),
                    "cannot be empty",
                ));
            }
        }

        self.pagination.validate()?;
        self.envelope.validate()?;
        self.http.validate()
    }

    /// Page size for a resource: its override, then its usual size, then the global size
    pub fn page_size_for(&self, kind: ResourceKind) -> u32 {
        self.resources
            .get(&kind)
            .and_then(|r| r.page_size)
            .or_else(|| kind.default_page_size())
            .unwrap_or(self.page_size)
    }

    /// Exhaustion policy for a resource
    pub fn exhaustion_for(&self, kind: ResourceKind) -> ExhaustionPolicy {
        self.resources
            .get(&kind)
            .and_then(|r| r.exhaustion)
            .unwrap_or(self.exhaustion)
    }

    /// Envelope layout for a resource, with its items field applied
    pub fn envelope_for(&self, kind: ResourceKind) -> EnvelopeConfig {
        let items_field = self
            .resources
            .get(&kind)
            .and_then(|r| r.items_field.clone())
            .or_else(|| kind.default_items_field().map(str::to_string));

        match items_field {
            Some(items_field) => EnvelopeConfig {
                items_field,
                ..self.envelope.clone()
            },
            None => self.envelope.clone(),
        }
    }

    /// HTTP client settings rooted at `base_url`
    pub fn http_client_config(&self) -> Result<HttpClientConfig> {
        Ok(self.http.to_client_config(Url::parse(&self.base_url)?))
    }
}

// ============================================================================
// Resource Overrides
// ============================================================================

/// Settings for one resource kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub page_size: Option<u32>,

    #[serde(default)]
    pub exhaustion: Option<ExhaustionPolicy>,

    /// Payload field holding the items
    #[serde(default)]
    pub items_field: Option<String>,
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries per request; 0 makes one `fetch_more` exactly one request
    #[serde(default)]
    pub max_retries: u32,

    /// Retry backoff strategy
    #[serde(default)]
    pub backoff: BackoffType,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Client-side rate limit; none when absent
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    30
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: 0,
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            rate_limit: None,
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("http.timeout_secs", "must be at least 1"));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(Error::invalid_value(
                "http.initial_backoff_ms",
                "cannot exceed max_backoff_ms",
            ));
        }
        if let Some(limit) = &self.rate_limit {
            if limit.requests_per_second == 0 || limit.burst_size == 0 {
                return Err(Error::invalid_value(
                    "http.rate_limit",
                    "requests_per_second and burst_size must be at least 1",
                ));
            }
        }
        Ok(())
    }

    /// Convert to the HTTP client's own config
    pub fn to_client_config(&self, base_url: Url) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                backoff: self.backoff,
                initial_delay: Duration::from_millis(self.initial_backoff_ms),
                max_delay: Duration::from_millis(self.max_backoff_ms),
            },
            rate_limit: self.rate_limit.clone(),
            headers: self.headers.clone(),
            user_agent: self.user_agent.clone().unwrap_or_else(default_user_agent),
            ..HttpClientConfig::new(base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ClientConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://127.0.0.1:8000/v2");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.http.max_retries, 0);
        assert!(config.http.rate_limit.is_none());
    }

    #[test]
    fn test_full_document() {
        let yaml = r"
base_url: https://july.example.com/v2
page_size: 12
pagination:
  style: offset
exhaustion: server_flag
envelope:
  success_codes: [0, 200]
http:
  timeout_secs: 5
  max_retries: 2
  backoff: linear
  rate_limit:
    requests_per_second: 4
    burst_size: 8
  headers:
    X-Client: july-ios
resources:
  topic:
    page_size: 30
    exhaustion: short_page
  emotion_stat:
    items_field: records
";
        let config = ClientConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.base_url, "https://july.example.com/v2");
        assert!(matches!(config.pagination, PaginationConfig::Offset { .. }));
        assert_eq!(config.envelope.success_codes, vec![0, 200]);
        assert_eq!(config.http.backoff, BackoffType::Linear);
        assert_eq!(config.page_size_for(ResourceKind::Topic), 30);
        assert_eq!(config.exhaustion_for(ResourceKind::Topic), ExhaustionPolicy::ShortPage);
        assert_eq!(config.exhaustion_for(ResourceKind::Comment), ExhaustionPolicy::ServerFlag);
        assert_eq!(config.envelope_for(ResourceKind::EmotionStat).items_field, "records");

        let http = config.http_client_config().unwrap();
        assert_eq!(http.base_url.as_str(), "https://july.example.com/v2");
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.retry.max_retries, 2);
        assert_eq!(http.retry.backoff, BackoffType::Linear);
        assert!(http.rate_limit.is_some());
        assert_eq!(
            http.headers.get("X-Client").map(String::as_str),
            Some("july-ios")
        );
    }

    #[test]
    fn test_page_size_precedence() {
        let mut config = ClientConfig::default();
        assert_eq!(config.page_size_for(ResourceKind::Topic), 10);
        assert_eq!(config.page_size_for(ResourceKind::Knowledge), 16);
        assert_eq!(config.page_size_for(ResourceKind::CustomAffirmation), 50);
        assert_eq!(config.page_size_for(ResourceKind::EmotionStat), 20);

        config.resources.insert(
            ResourceKind::Knowledge,
            ResourceConfig {
                page_size: Some(8),
                ..ResourceConfig::default()
            },
        );
        assert_eq!(config.page_size_for(ResourceKind::Knowledge), 8);
    }

    #[test]
    fn test_envelope_items_field_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.envelope_for(ResourceKind::Topic).items_field, "items");
        assert_eq!(config.envelope_for(ResourceKind::EmotionStat).items_field, "stats");
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            "base_url: not a url",
            "base_url: ftp://files.example.com",
            "page_size: 0",
            "resources:\n  topic:\n    page_size: 0",
            "resources:\n  topic:\n    items_field: ''",
            "http:\n  timeout_secs: 0",
            "http:\n  initial_backoff_ms: 500\n  max_backoff_ms: 100",
            "http:\n  rate_limit:\n    requests_per_second: 0",
            "pagination:\n  style: page_number\n  page_param: ''",
            "envelope:\n  success_codes: []",
        ];
        for yaml in cases {
            let err = ClientConfig::from_yaml_str(yaml).unwrap_err();
            assert!(err.is_configuration(), "{yaml}: {err}");
        }
    }

    #[test]
    fn test_unknown_resource_is_rejected() {
        let err = ClientConfig::from_yaml_str("resources:\n  diary:\n    page_size: 3").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "page_size: 25").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.page_size, 25);

        let err = ClientConfig::load("/nonexistent/july.yaml").unwrap_err();
        assert!(err.is_configuration());
    }
}
