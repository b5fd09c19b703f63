use std::fmt;

use serde::{Deserialize, Serialize};

pub const IF_MATCH: &str = "if-match";

/// Entity tag as returned in the `ETag` header, quotes included.
///
/// Passed back verbatim in `If-Match`; [`ETag::any`] matches every version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `*`, for unconditional updates and deletes
    #[must_use]
    pub fn any() -> Self {
        Self("*".to_owned())
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        self.0 == "*"
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the `ETag` response header.
    #[must_use]
    pub fn from_response(response: &armkit_http::HttpResponse) -> Option<Self> {
        response
            .header_str("etag")
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ETag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ETag {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_any_matches_wildcard() {
        assert!(ETag::any().is_any());
        assert!(!ETag::from("\"AAAAAAAAAAA=\"").is_any());
        assert_eq!(ETag::any().to_string(), "*");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let tag: ETag = serde_json::from_str("\"\\\"abc\\\"\"").unwrap();
        assert_eq!(tag.as_str(), "\"abc\"");
    }
}
