use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{DataApiError, DataApiResult};

static VERSION_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v[\d.]+(?:\.(lts|preview\d+))?$").expect("version pattern is valid")
});

const NAMED_VERSIONS: [&str; 3] = ["latest", "latest-lts", "developer"];

/// Whether a path segment names an API version (`v1`, `v2023.1.LTS`,
/// `v2024.2.preview1`, `latest`, ...). Case-insensitive.
pub fn is_version_segment(segment: &str) -> bool {
    let segment = segment.to_lowercase();
    VERSION_SEGMENT.is_match(&segment) || NAMED_VERSIONS.contains(&segment.as_str())
}

/// Routing action for the `X-Learnosity-Action` header: `<action>_<path>`,
/// where path is the endpoint path without a trailing slash or a leading
/// version segment.
pub fn derive_action(endpoint: &str, action: &str) -> DataApiResult<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| DataApiError::Config(format!("invalid endpoint {endpoint:?}: {e}")))?;

    let mut path = url.path().strip_suffix('/').unwrap_or(url.path()).to_string();

    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() > 1 && is_version_segment(segments[1]) {
        path = format!("/{}", segments[2..].join("/"));
    }

    Ok(format!("{action}_{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_lts_version() {
        assert_eq!(
            derive_action("https://data.learnosity.com/v2023.1.LTS/itembank/items", "get").unwrap(),
            "get_/itembank/items"
        );
    }

    #[test]
    fn strips_named_versions() {
        for version in ["latest", "latest-lts", "developer", "LATEST"] {
            let endpoint = format!("https://data.learnosity.com/{version}/itembank/items");
            assert_eq!(
                derive_action(&endpoint, "get").unwrap(),
                "get_/itembank/items",
                "{version}"
            );
        }
    }

    #[test]
    fn keeps_unversioned_path() {
        assert_eq!(
            derive_action("https://data.learnosity.com/itembank/items", "get").unwrap(),
            "get_/itembank/items"
        );
    }

    #[test]
    fn ignores_trailing_slash() {
        assert_eq!(
            derive_action("https://data.learnosity.com/v1/itembank/items/", "set").unwrap(),
            "set_/itembank/items"
        );
    }

    #[test]
    fn version_segment_patterns() {
        assert!(is_version_segment("v1"));
        assert!(is_version_segment("v2023.1.lts"));
        assert!(is_version_segment("v2024.2.preview1"));
        assert!(is_version_segment("V2023.1.LTS"));
        assert!(!is_version_segment("itembank"));
        assert!(!is_version_segment("v"));
        assert!(!is_version_segment("vx1"));
    }

    #[test]
    fn version_only_path() {
        assert_eq!(derive_action("https://host/v1", "get").unwrap(), "get_/");
    }

    #[test]
    fn rejects_relative_endpoint() {
        let error = derive_action("itembank/items", "get").unwrap_err();
        assert!(matches!(error, DataApiError::Config(_)));
    }
}
