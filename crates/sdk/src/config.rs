//! Data API client configuration.
//!
//! | Environment Variable | Description |
//! |----------------------|-------------|
//! | `LEARNOSITY_CONSUMER_KEY` | Consumer key |
//! | `LEARNOSITY_CONSUMER_SECRET` | Consumer secret |
//! | `LEARNOSITY_DOMAIN` | Domain for the security packet (default: `localhost`) |
//! | `LEARNOSITY_DATA_URL` | Data API base URL (default: `https://data.learnosity.com`) |
//! | `LEARNOSITY_DATA_VERSION` | API version segment (default: `v2023.1.LTS`) |
//! | `LEARNOSITY_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `LEARNOSITY_MAX_PAGES` | Stop paginating after this many pages (default: unlimited) |

use serde::{Deserialize, Serialize};

use crate::signing::SecurityPacket;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataApiConfig {
    #[serde(default)]
    pub consumer_key: String,

    #[serde(default, skip_serializing)]
    pub consumer_secret: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Version path segment, e.g. `v2023.1.LTS`. Empty for unversioned URLs.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on pages fetched by one iteration. `None` follows the
    /// server's cursor for as long as it keeps returning one.
    #[serde(default)]
    pub max_pages: Option<usize>,
}

fn default_domain() -> String {
    "localhost".to_string()
}

fn default_base_url() -> String {
    "https://data.learnosity.com".to_string()
}

fn default_version() -> String {
    "v2023.1.LTS".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for DataApiConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            domain: default_domain(),
            base_url: default_base_url(),
            version: default_version(),
            timeout_secs: default_timeout(),
            max_pages: None,
        }
    }
}

impl DataApiConfig {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Create config from `LEARNOSITY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            consumer_key: lookup("LEARNOSITY_CONSUMER_KEY").unwrap_or_default(),
            consumer_secret: lookup("LEARNOSITY_CONSUMER_SECRET").unwrap_or_default(),
            domain: lookup("LEARNOSITY_DOMAIN").unwrap_or_else(default_domain),
            base_url: lookup("LEARNOSITY_DATA_URL").unwrap_or_else(default_base_url),
            version: lookup("LEARNOSITY_DATA_VERSION").unwrap_or_else(default_version),
            timeout_secs: lookup("LEARNOSITY_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            max_pages: lookup("LEARNOSITY_MAX_PAGES").and_then(|v| v.parse().ok()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Full endpoint URL for a resource path such as `itembank/items`.
    pub fn endpoint(&self, resource: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let resource = resource.trim_start_matches('/');
        let version = self.version.trim_matches('/');
        if version.is_empty() {
            format!("{base}/{resource}")
        } else {
            format!("{base}/{version}/{resource}")
        }
    }

    /// Security packet for the configured consumer and domain.
    pub fn security_packet(&self) -> SecurityPacket {
        SecurityPacket::new(&self.consumer_key, &self.domain)
    }
}
