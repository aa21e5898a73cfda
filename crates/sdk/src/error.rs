use serde_json::Value;

/// Errors raised while normalizing caller input for signing.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("request packet is not valid JSON: {0}")]
    InvalidRequest(#[from] serde_json::Error),
}

/// Errors surfaced by the Data API client.
///
/// None of these are retried; each one ends the current call or iteration.
#[derive(Debug, thiserror::Error)]
pub enum DataApiError {
    /// The transport answered with a non-success HTTP status.
    #[error("Server returned HTTP status {status}: {body}")]
    Transport { status: u16, body: String },
    /// The response body is not a JSON page.
    #[error("Server returned invalid JSON: {body}")]
    Decode { body: String },
    /// The page decoded but `meta.status` is missing or false.
    #[error("Server returned unsuccessful status: {body}")]
    Rejected { body: Value },
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Stopped after {limit} pages while the server still reported more")]
    PageLimit { limit: usize },
}

impl From<reqwest::Error> for DataApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

/// Result type for Data API operations.
pub type DataApiResult<T> = Result<T, DataApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transport_error_carries_status_and_body() {
        let error = DataApiError::Transport {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(
            error.to_string(),
            "Server returned HTTP status 503: unavailable"
        );
    }

    #[test]
    fn rejected_error_renders_body_as_json() {
        let error = DataApiError::Rejected {
            body: json!({"meta": {"status": false}}),
        };
        assert_eq!(
            error.to_string(),
            r#"Server returned unsuccessful status: {"meta":{"status":false}}"#
        );
    }

    #[test]
    fn decode_error_carries_raw_body() {
        let error = DataApiError::Decode {
            body: "<html>".into(),
        };
        assert_eq!(error.to_string(), "Server returned invalid JSON: <html>");
    }

    #[test]
    fn page_limit_names_limit() {
        let error = DataApiError::PageLimit { limit: 3 };
        assert!(error.to_string().contains("3 pages"));
    }
}
