use url::Url;

use crate::error::ArmError;

/// Builds a request URL from an endpoint and a path template such as
/// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}`.
///
/// Setters never fail; the first problem is kept and returned by
/// [`build`](Self::build).
#[derive(Debug)]
#[must_use = "UrlTemplate does nothing until .build() is called"]
pub struct UrlTemplate {
    endpoint: String,
    path: String,
    query: Vec<(String, String)>,
    error: Option<ArmError>,
}

impl UrlTemplate {
    pub fn new(endpoint: &str, path: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            path: path.to_owned(),
            query: Vec::new(),
            error: None,
        }
    }

    /// Substitute `{name}` with the percent-encoded `value`.
    ///
    /// An empty value records [`ArmError::MissingParameter`].
    pub fn path_param(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if value.is_empty() {
            self.error = Some(ArmError::MissingParameter(name.to_owned()));
            return self;
        }
        let placeholder = format!("{{{name}}}");
        self.path = self
            .path
            .replace(&placeholder, &urlencoding::encode(value));
        self
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_owned(), value.into()));
        self
    }

    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v.to_string()),
            None => self,
        }
    }

    pub fn api_version(self, version: &str) -> Self {
        self.query("api-version", version)
    }

    /// # Errors
    /// The first recorded parameter error, or [`ArmError::InvalidUrl`] when
    /// the assembled URL does not parse or still holds a placeholder.
    pub fn build(self) -> Result<Url, ArmError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(start) = self.path.find('{') {
            return Err(ArmError::InvalidUrl(format!(
                "unbound path parameter in {}",
                &self.path[start..]
            )));
        }
        let mut url = Url::parse(&format!("{}{}", self.endpoint, self.path))
            .map_err(|e| ArmError::InvalidUrl(format!("{}{}: {e}", self.endpoint, self.path)))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.ApiManagement/service/{serviceName}";

    #[test]
    fn test_builds_encoded_path_and_query() {
        let url = UrlTemplate::new("https://management.azure.com/", PATH)
            .path_param("subscriptionId", "sub-1")
            .path_param("resourceGroupName", "rg 1")
            .path_param("serviceName", "apim/x")
            .api_version("2024-05-01")
            .query_opt("$top", Some(10))
            .query_opt::<String>("$filter", None)
            .build()
            .unwrap();

        assert_eq!(
            url.path(),
            "/subscriptions/sub-1/resourceGroups/rg%201/providers/Microsoft.ApiManagement/service/apim%2Fx"
        );
        assert_eq!(url.query(), Some("api-version=2024-05-01&%24top=10"));
    }

    #[test]
    fn test_empty_parameter_is_reported_by_name() {
        let err = UrlTemplate::new("https://management.azure.com", PATH)
            .path_param("subscriptionId", "sub-1")
            .path_param("resourceGroupName", "")
            .path_param("serviceName", "")
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "parameter resourceGroupName cannot be empty");
    }

    #[test]
    fn test_unbound_placeholder_is_an_error() {
        let err = UrlTemplate::new("https://management.azure.com", PATH)
            .path_param("subscriptionId", "sub-1")
            .build()
            .unwrap_err();
        assert!(matches!(err, ArmError::InvalidUrl(m) if m.contains("{resourceGroupName}")));
    }

    #[test]
    fn test_bad_endpoint() {
        let err = UrlTemplate::new("not a url", "/x").build().unwrap_err();
        assert!(matches!(err, ArmError::InvalidUrl(_)));
    }
}
