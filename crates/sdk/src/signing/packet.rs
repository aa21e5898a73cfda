use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PacketError;

/// Identity, timestamp and signature sent alongside every API request.
///
/// `init` mutates the packet in place: it fills `timestamp` when absent,
/// may back-fill `user_id` from the request and always overwrites
/// `signature`. Missing `consumer_key`/`domain` are signed as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPacket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// UTC, `YYYYMMDD-HHmm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SecurityPacket {
    pub fn new(consumer_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            consumer_key: Some(consumer_key.into()),
            domain: Some(domain.into()),
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    /// Set, non-empty user id.
    pub fn effective_user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The packet as a JSON object, fields in wire order.
    pub fn to_map(&self) -> Map<String, Value> {
        let fields = [
            ("consumer_key", &self.consumer_key),
            ("domain", &self.domain),
            ("timestamp", &self.timestamp),
            ("user_id", &self.user_id),
            ("expires", &self.expires),
            ("signature", &self.signature),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .map(|value| (name.to_string(), Value::String(value.clone())))
            })
            .collect()
    }

    /// Compact JSON encoding, as sent in the `security` form field.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.to_map()).to_string()
    }
}

/// A request payload, supplied either as a JSON document or as an
/// already-encoded JSON string.
///
/// The encoded form is parsed up front so signing never fails. Envelopes
/// that echo the request back keep the caller's form: an encoded request
/// comes back as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPacket {
    value: Value,
    encoded: bool,
}

impl RequestPacket {
    /// Parse an already-encoded JSON request.
    pub fn encoded(raw: &str) -> Result<Self, PacketError> {
        let value = serde_json::from_str(raw)?;
        Ok(Self {
            value,
            encoded: true,
        })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the caller supplied the request as a string.
    pub fn is_encoded(&self) -> bool {
        self.encoded
    }

    /// Set a top-level field. Returns `false` when the request is not an
    /// object and the field could not be set.
    pub fn set_field(&mut self, name: &str, value: Value) -> bool {
        match self.value.as_object_mut() {
            Some(fields) => {
                fields.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub(crate) fn into_parts(self) -> (Value, bool) {
        (self.value, self.encoded)
    }
}

impl Default for RequestPacket {
    fn default() -> Self {
        Self::from(Value::Object(Map::new()))
    }
}

impl From<Value> for RequestPacket {
    fn from(value: Value) -> Self {
        Self {
            value,
            encoded: false,
        }
    }
}

impl From<Map<String, Value>> for RequestPacket {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from(Value::Object(fields))
    }
}

impl FromStr for RequestPacket {
    type Err = PacketError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::encoded(raw)
    }
}
