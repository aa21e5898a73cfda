use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::json::normalize_numbers;

use super::packet::{RequestPacket, SecurityPacket};
use super::scheme::{Sha256Scheme, SignatureInput, SignatureScheme};
use super::service::Service;
use super::telemetry::{self, SdkMeta};

/// Domain used for the nested Questions API activity when neither the
/// security packet nor the activity names one.
pub const ASSESS_DEFAULT_DOMAIN: &str = "assess.learnosity.com";

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M";

/// `{ security, request }` init options shared by most services.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedEnvelope {
    pub security: SecurityPacket,
    /// The request in the caller's form: a string if it was given encoded.
    pub request: Value,
}

/// Form fields posted to the Data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataEnvelope {
    pub security: String,
    pub request: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Init options for one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InitOutput {
    /// author, items, reports, authoraide and unknown services.
    Envelope(SignedEnvelope),
    Data(DataEnvelope),
    /// questions: security fields and request fields in one object.
    Flat(Map<String, Value>),
    /// assess: the request, signed inside `questionsApiActivity`.
    Activity(Value),
}

impl InitOutput {
    /// The signature the output carries, wherever the service puts it.
    pub fn signature(&self) -> Option<String> {
        match self {
            Self::Envelope(envelope) => envelope.security.signature.clone(),
            Self::Data(envelope) => serde_json::from_str::<SecurityPacket>(&envelope.security)
                .ok()
                .and_then(|packet| packet.signature),
            Self::Flat(fields) => fields
                .get("signature")
                .and_then(Value::as_str)
                .map(str::to_owned),
            Self::Activity(request) => request
                .get("questionsApiActivity")
                .and_then(|activity| activity.get("signature"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}

/// Request after normalization, telemetry and signing.
struct Prepared {
    value: Value,
    encoded: bool,
    serialized: String,
}

/// Signs requests and assembles the per-service init options.
///
/// The telemetry setting is fixed when the engine is built; `Default`
/// takes it from the process-wide switch.
#[derive(Clone)]
pub struct SignerEngine {
    scheme: Arc<dyn SignatureScheme>,
    telemetry: bool,
}

impl Default for SignerEngine {
    fn default() -> Self {
        Self {
            scheme: Arc::new(Sha256Scheme),
            telemetry: telemetry::telemetry_enabled(),
        }
    }
}

impl std::fmt::Debug for SignerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerEngine")
            .field("scheme", &self.scheme.name())
            .field("telemetry", &self.telemetry)
            .finish()
    }
}

impl SignerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scheme(mut self, scheme: Arc<dyn SignatureScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_telemetry(mut self, enabled: bool) -> Self {
        self.telemetry = enabled;
        self
    }

    pub fn telemetry(&self) -> bool {
        self.telemetry
    }

    pub fn scheme(&self) -> &dyn SignatureScheme {
        self.scheme.as_ref()
    }

    /// Sign `request` for `service` and build its init options.
    ///
    /// `security` is updated in place: a missing timestamp is filled with
    /// the current UTC minute, `signature` is overwritten, and for
    /// `questions` the domain is removed.
    pub fn init(
        &self,
        service: &Service,
        security: &mut SecurityPacket,
        secret: &str,
        request: impl Into<RequestPacket>,
        action: Option<&str>,
    ) -> InitOutput {
        let prepared = self.prepare(service, security, secret, request.into(), action);

        match service {
            Service::Data => InitOutput::Data(DataEnvelope {
                security: security.to_json_string(),
                request: prepared.serialized,
                action: action.map(str::to_owned),
            }),
            Service::Questions => {
                security.domain = None;
                let mut fields = security.to_map();
                if let Value::Object(request_fields) = prepared.value {
                    fields.extend(request_fields);
                }
                InitOutput::Flat(fields)
            }
            Service::Assess => InitOutput::Activity(prepared.value),
            _ => InitOutput::Envelope(SignedEnvelope {
                security: security.clone(),
                request: if prepared.encoded {
                    Value::String(prepared.serialized)
                } else {
                    prepared.value
                },
            }),
        }
    }

    /// Sign a Data API request and return its form fields.
    pub fn sign_data(
        &self,
        security: &mut SecurityPacket,
        secret: &str,
        request: impl Into<RequestPacket>,
        action: &str,
    ) -> DataEnvelope {
        let prepared = self.prepare(&Service::Data, security, secret, request.into(), Some(action));
        DataEnvelope {
            security: security.to_json_string(),
            request: prepared.serialized,
            action: Some(action.to_string()),
        }
    }

    fn prepare(
        &self,
        service: &Service,
        security: &mut SecurityPacket,
        secret: &str,
        request: RequestPacket,
        action: Option<&str>,
    ) -> Prepared {
        let (mut value, encoded) = request.into_parts();

        if self.telemetry {
            telemetry::attach(&mut value, SdkMeta::current());
        }

        if security.timestamp.as_deref().is_none_or(str::is_empty) {
            security.timestamp = Some(current_timestamp());
        }

        if *service == Service::Assess {
            sign_assess_activity(&mut value, security, secret, self.scheme.as_ref());
        }

        if service.shares_user_identity() && security.effective_user_id().is_none() {
            if let Some(user_id) = value.get("user_id").and_then(user_id_from) {
                security.user_id = Some(user_id);
            }
        }

        normalize_numbers(&mut value);
        let serialized = value.to_string();
        let signature = {
            let mut input = identity_input(security, security.domain.as_deref().unwrap_or_default());
            if let Some(user_id) = security.effective_user_id() {
                input.identity.push(user_id);
            }
            if service.signs_request() && !serialized.is_empty() {
                input.push_trailing(&serialized);
            }
            if let Some(action) = action.filter(|action| !action.is_empty()) {
                input.push_trailing(action);
            }
            self.scheme.sign(&input, secret)
        };
        security.signature = Some(signature);

        debug!(
            service = %service,
            action = action.unwrap_or_default(),
            scheme = self.scheme.name(),
            telemetry = self.telemetry,
            "signed request"
        );

        Prepared {
            value,
            encoded,
            serialized,
        }
    }
}

fn current_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Consumer key, domain and timestamp, absent values as empty segments.
fn identity_input<'a>(security: &'a SecurityPacket, domain: &'a str) -> SignatureInput<'a> {
    SignatureInput::new(vec![
        security.consumer_key.as_deref().unwrap_or_default(),
        domain,
        security.timestamp.as_deref().unwrap_or_default(),
    ])
}

fn user_id_from(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Copy the outer identity into `questionsApiActivity` and sign it on its
/// own: consumer key, resolved domain, timestamp, user id (empty when
/// absent) and secret. No request and no action.
fn sign_assess_activity(
    request: &mut Value,
    security: &SecurityPacket,
    secret: &str,
    scheme: &dyn SignatureScheme,
) {
    let Some(activity) = request
        .get_mut("questionsApiActivity")
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    let domain = security
        .domain
        .as_deref()
        .filter(|domain| !domain.is_empty())
        .or_else(|| {
            activity
                .get("domain")
                .and_then(Value::as_str)
                .filter(|domain| !domain.is_empty())
        })
        .unwrap_or(ASSESS_DEFAULT_DOMAIN)
        .to_string();

    activity.shift_remove("domain");
    set_or_remove(activity, "consumer_key", security.consumer_key.as_deref());
    set_or_remove(activity, "timestamp", security.timestamp.as_deref());
    set_or_remove(activity, "user_id", security.user_id.as_deref());

    let mut input = identity_input(security, &domain);
    input.identity.push(security.user_id.as_deref().unwrap_or_default());
    activity.insert("signature".to_string(), Value::String(scheme.sign(&input, secret)));
}

/// Overwrite in place (keeping the key's position) or drop the field.
fn set_or_remove(fields: &mut Map<String, Value>, name: &str, value: Option<&str>) {
    match value {
        Some(value) => {
            fields.insert(name.to_string(), Value::String(value.to_string()));
        }
        None => {
            fields.shift_remove(name);
        }
    }
}
