//! Request signing and Data API pagination for the Learnosity API family.
//!
//! [`SignerEngine::init`] turns a security packet, secret and request into
//! the init options a given service expects. [`DataApi`] builds on it to
//! call the Data API and walk its paginated results as streams.
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use learnosity_sdk::{DataApi, DataApiConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), learnosity_sdk::DataApiError> {
//! let config = DataApiConfig::from_env();
//! let api = DataApi::new(config.clone())?;
//! let endpoint = config.endpoint("itembank/items");
//! let security = api.security_packet();
//!
//! let items: Vec<_> = api
//!     .results_iter(&endpoint, &security, &config.consumer_secret, json!({"limit": 50}), "get")
//!     .try_collect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data_api;
pub mod error;
mod json;
pub mod signing;
pub mod uuid;

pub use config::DataApiConfig;
pub use data_api::{DataApi, Page, PageData, PageMeta, Transport, TransportRequest, TransportResponse};
pub use error::{DataApiError, DataApiResult, PacketError};
pub use signing::{
    DataEnvelope, HmacSha256Scheme, InitOutput, RequestPacket, SecurityPacket, Service,
    Sha256Scheme, SignatureScheme, SignedEnvelope, SignerEngine, disable_telemetry,
    enable_telemetry,
};
