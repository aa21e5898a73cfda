//! Data API client: signed requests and lazy pagination.

mod action;
mod page;
mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DataApiConfig;
use crate::error::{DataApiError, DataApiResult};
use crate::json::is_truthy;
use crate::signing::{DataEnvelope, RequestPacket, SecurityPacket, SignerEngine};

pub use action::{derive_action, is_version_segment};
pub use page::{Page, PageData, PageMeta};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

/// Value sent in the `X-Learnosity-SDK` header.
pub const SDK_HEADER_VALUE: &str = concat!("Rust:", env!("CARGO_PKG_VERSION"));

pub const HEADER_CONSUMER: &str = "X-Learnosity-Consumer";
pub const HEADER_ACTION: &str = "X-Learnosity-Action";
pub const HEADER_SDK: &str = "X-Learnosity-SDK";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Field of the request that carries the pagination cursor.
const CURSOR_FIELD: &str = "next";

/// Client for the Data API.
///
/// Every call signs with service `data`. Iteration is pull-based: nothing is
/// fetched until the consumer polls for the next page, and dropping a
/// stream stops it.
#[derive(Clone)]
pub struct DataApi {
    config: DataApiConfig,
    transport: Arc<dyn Transport>,
    engine: SignerEngine,
}

/// Per-iteration state: private copies of the caller's packets plus the
/// cursor position.
struct Cursor {
    security: SecurityPacket,
    request: RequestPacket,
    finished: bool,
    fetched: usize,
}

impl DataApi {
    /// Create a client using the default `reqwest` transport.
    pub fn new(config: DataApiConfig) -> DataApiResult<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `LEARNOSITY_*` environment variables.
    pub fn from_env() -> DataApiResult<Self> {
        Self::new(DataApiConfig::from_env())
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: DataApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            engine: SignerEngine::default(),
        }
    }

    /// Replace the signing engine (scheme or telemetry setting).
    pub fn with_engine(mut self, engine: SignerEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &DataApiConfig {
        &self.config
    }

    pub fn engine(&self) -> &SignerEngine {
        &self.engine
    }

    /// Security packet for the configured consumer and domain.
    pub fn security_packet(&self) -> SecurityPacket {
        self.config.security_packet()
    }

    /// Sign and send one request. The response is returned as-is; HTTP
    /// status is not interpreted here.
    ///
    /// `security` is updated the way `SignerEngine::init` updates it.
    pub async fn request(
        &self,
        endpoint: &str,
        security: &mut SecurityPacket,
        secret: &str,
        request: impl Into<RequestPacket>,
        action: &str,
    ) -> DataApiResult<TransportResponse> {
        let derived_action = derive_action(endpoint, action)?;
        let consumer = security.consumer_key.clone().unwrap_or_default();
        let envelope = self.engine.sign_data(security, secret, request, action);

        let headers = BTreeMap::from([
            ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            (HEADER_CONSUMER.to_string(), consumer),
            (HEADER_ACTION.to_string(), derived_action),
            (HEADER_SDK.to_string(), SDK_HEADER_VALUE.to_string()),
        ]);

        debug!(endpoint, action = %headers[HEADER_ACTION], "sending data api request");

        self.transport
            .send(TransportRequest {
                url: endpoint.to_string(),
                method: "POST".to_string(),
                headers,
                body: encode_form(&envelope),
            })
            .await
    }

    /// Lazily fetch pages, following `meta.next` until the server stops
    /// returning a cursor or a page comes back empty.
    ///
    /// The caller's packets are copied once; every page is signed with the
    /// same identity and timestamp.
    pub fn request_iter<'a, R>(
        &'a self,
        endpoint: &'a str,
        security: &SecurityPacket,
        secret: &'a str,
        request: R,
        action: &'a str,
    ) -> impl Stream<Item = DataApiResult<Page>> + use<'a, R>
    where
        R: Into<RequestPacket>,
    {
        let cursor = Cursor {
            security: security.clone(),
            request: request.into(),
            finished: false,
            fetched: 0,
        };

        stream::try_unfold(cursor, move |mut cursor| async move {
            if cursor.finished {
                return Ok(None);
            }
            if let Some(limit) = self.config.max_pages {
                if cursor.fetched >= limit {
                    warn!(limit, endpoint, "page limit reached with more pages pending");
                    return Err(DataApiError::PageLimit { limit });
                }
            }

            let page = self
                .fetch_page(endpoint, &mut cursor.security, secret, cursor.request.clone(), action)
                .await?;
            cursor.fetched += 1;

            match page.next_cursor() {
                Some(next) => {
                    if !cursor.request.set_field(CURSOR_FIELD, Value::String(next.to_string())) {
                        warn!(endpoint, "request is not an object; cannot follow cursor");
                        cursor.finished = true;
                    }
                }
                None => cursor.finished = true,
            }

            debug!(
                page = cursor.fetched,
                records = ?page.meta.records,
                has_next = !cursor.finished,
                "fetched page"
            );

            Ok::<_, DataApiError>(Some((page, cursor)))
        })
    }

    /// Lazily yield individual results across all pages. List pages yield
    /// their items; keyed pages yield one single-entry object per key.
    pub fn results_iter<'a, R>(
        &'a self,
        endpoint: &'a str,
        security: &SecurityPacket,
        secret: &'a str,
        request: R,
        action: &'a str,
    ) -> impl Stream<Item = DataApiResult<Value>> + use<'a, R>
    where
        R: Into<RequestPacket>,
    {
        self.request_iter(endpoint, security, secret, request, action)
            .map_ok(|page| stream::iter(page.into_results()).map(Ok::<Value, DataApiError>))
            .try_flatten()
    }

    async fn fetch_page(
        &self,
        endpoint: &str,
        security: &mut SecurityPacket,
        secret: &str,
        request: RequestPacket,
        action: &str,
    ) -> DataApiResult<Page> {
        let response = self.request(endpoint, security, secret, request, action).await?;

        if !response.ok() {
            warn!(status = response.status, endpoint, "data api returned error status");
            return Err(DataApiError::Transport {
                status: response.status,
                body: response.body,
            });
        }

        let body: Value = response.json().map_err(|_| DataApiError::Decode {
            body: response.body.clone(),
        })?;

        let accepted = body
            .get("meta")
            .and_then(|meta| meta.get("status"))
            .is_some_and(is_truthy);
        if !accepted {
            warn!(endpoint, "data api rejected request");
            return Err(DataApiError::Rejected { body });
        }

        serde_json::from_value(body).map_err(|_| DataApiError::Decode {
            body: response.body,
        })
    }
}

/// URL-encode the three Data API form fields.
fn encode_form(envelope: &DataEnvelope) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("security", &envelope.security)
        .append_pair("request", &envelope.request)
        .append_pair("action", envelope.action.as_deref().unwrap_or_default())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_encodes_all_three_fields() {
        let body = encode_form(&DataEnvelope {
            security: r#"{"a":"b c"}"#.into(),
            request: "{}".into(),
            action: Some("get".into()),
        });
        assert_eq!(body, "security=%7B%22a%22%3A%22b+c%22%7D&request=%7B%7D&action=get");

        let fields: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(fields[0], ("security".into(), r#"{"a":"b c"}"#.into()));
    }

    #[test]
    fn sdk_header_names_rust_and_version() {
        assert_eq!(SDK_HEADER_VALUE, format!("Rust:{}", env!("CARGO_PKG_VERSION")));
    }
}
