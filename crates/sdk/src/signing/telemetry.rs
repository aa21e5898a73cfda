//! SDK telemetry attached to signed requests under `meta.sdk`.
//!
//! Telemetry is on by default. The process-wide switch below is a plain
//! last-write-wins flag: concurrent `enable_telemetry`/`disable_telemetry`
//! calls from different call sites race, and an engine only observes the
//! value current when it was built. Code that needs a fixed setting should
//! pass it explicitly with `SignerEngine::with_telemetry`.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::{Map, Value};
use sysinfo::System;

use crate::json::is_truthy;

static TELEMETRY_ENABLED: AtomicBool = AtomicBool::new(true);
static SDK_META: OnceLock<SdkMeta> = OnceLock::new();

/// Turn telemetry on for engines built from now on.
pub fn enable_telemetry() {
    TELEMETRY_ENABLED.store(true, Ordering::Relaxed);
}

/// Turn telemetry off for engines built from now on.
pub fn disable_telemetry() {
    TELEMETRY_ENABLED.store(false, Ordering::Relaxed);
}

pub fn telemetry_enabled() -> bool {
    TELEMETRY_ENABLED.load(Ordering::Relaxed)
}

/// Describes the SDK and the host it runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkMeta {
    pub version: String,
    pub lang: String,
    /// Version of the compiler that built the SDK.
    pub lang_version: String,
    pub platform: String,
    pub platform_version: String,
}

impl SdkMeta {
    /// Computed on first use, then shared for the life of the process.
    pub fn current() -> &'static SdkMeta {
        SDK_META.get_or_init(|| SdkMeta {
            version: format!("v{}", env!("CARGO_PKG_VERSION")),
            lang: "rust".to_string(),
            lang_version: env!("LEARNOSITY_RUSTC_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            platform_version: System::kernel_version().unwrap_or_default(),
        })
    }

    fn to_value(&self) -> Value {
        let fields: Map<String, Value> = [
            ("version", &self.version),
            ("lang", &self.lang),
            ("lang_version", &self.lang_version),
            ("platform", &self.platform),
            ("platform_version", &self.platform_version),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.clone())))
        .collect();
        Value::Object(fields)
    }
}

/// Set `meta.sdk` on an object request.
///
/// An existing `meta` object keeps its other fields; a missing or falsy
/// `meta` is replaced. Non-object requests and non-object truthy `meta`
/// values are left untouched.
pub(crate) fn attach(request: &mut Value, meta: &SdkMeta) {
    let Some(fields) = request.as_object_mut() else {
        return;
    };

    let replace = match fields.get("meta") {
        Some(Value::Object(_)) => false,
        Some(existing) => !is_truthy(existing),
        None => true,
    };

    if replace {
        let mut block = Map::new();
        block.insert("sdk".to_string(), meta.to_value());
        fields.insert("meta".to_string(), Value::Object(block));
    } else if let Some(Value::Object(existing)) = fields.get_mut("meta") {
        existing.insert("sdk".to_string(), meta.to_value());
    }
}
