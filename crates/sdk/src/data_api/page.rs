use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::json::is_truthy;

/// One page returned by the Data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub meta: PageMeta,
    #[serde(default)]
    pub data: PageData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub status: bool,
    /// Cursor for the following page. Numeric cursors are kept in their
    /// decimal form; values that cannot be a cursor read as `None`.
    #[serde(default, deserialize_with = "deserialize_cursor", skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Total record count. Whole floats and numeric strings are accepted;
    /// anything else reads as `None`.
    #[serde(default, deserialize_with = "deserialize_count", skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Page payload: a list resource or a keyed (dictionary) resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageData {
    List(Vec<Value>),
    Keyed(Map<String, Value>),
    Other(Value),
}

impl Default for PageData {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl PageData {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Keyed(entries) => entries.is_empty(),
            Self::Other(_) => true,
        }
    }

    /// Individual results: list items in order, or one single-entry
    /// object per key of a keyed page, in key order.
    pub fn into_results(self) -> Vec<Value> {
        match self {
            Self::List(items) => items,
            Self::Keyed(entries) => entries
                .into_iter()
                .map(|(key, value)| Value::Object(Map::from_iter([(key, value)])))
                .collect(),
            Self::Other(_) => Vec::new(),
        }
    }
}

impl Page {
    /// Cursor for the following page, if the server reported one and this
    /// page carried data.
    pub fn next_cursor(&self) -> Option<&str> {
        self.meta
            .next
            .as_deref()
            .filter(|next| !next.is_empty() && !self.data.is_empty())
    }

    pub fn into_results(self) -> Vec<Value> {
        self.data.into_results()
    }
}

fn deserialize_truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Value::deserialize(deserializer).map(|value| is_truthy(&value))
}

fn deserialize_cursor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Value::deserialize(deserializer).map(|value| match value {
        Value::String(cursor) => Some(cursor),
        Value::Number(cursor) => Some(cursor.to_string()),
        _ => None,
    })
}

fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Value::deserialize(deserializer).map(|value| match value {
        Value::Number(count) => count.as_u64().or_else(|| {
            count
                .as_f64()
                .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
                .map(|n| n as u64)
        }),
        Value::String(count) => count.trim().parse().ok(),
        _ => None,
    })
}
