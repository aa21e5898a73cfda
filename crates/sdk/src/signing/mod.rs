mod engine;
mod packet;
mod scheme;
mod service;
mod telemetry;

pub use engine::{
    ASSESS_DEFAULT_DOMAIN, DataEnvelope, InitOutput, SignedEnvelope, SignerEngine,
};
pub use packet::{RequestPacket, SecurityPacket};
pub use scheme::{
    HMAC_SHA256_PREFIX, HmacSha256Scheme, SEGMENT_SEPARATOR, Sha256Scheme, SignatureInput,
    SignatureScheme,
};
pub use service::Service;
pub use telemetry::{SdkMeta, disable_telemetry, enable_telemetry, telemetry_enabled};
