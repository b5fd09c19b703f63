//! Optional parameters of list and delete operations.

use armkit_runtime::UrlTemplate;

use crate::models::PolicyExportFormat;

/// OData paging and filtering for list operations.
///
/// ```
/// use armapimanagement::ListOptions;
///
/// let options = ListOptions::default().with_filter("properties/alwaysLog eq 'allErrors'").with_top(10);
/// assert_eq!(options.top, Some(10));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// `$filter` expression; the fields and functions allowed depend on
    /// the operation.
    pub filter: Option<String>,
    /// Page size (`$top`, at least 1).
    pub top: Option<u32>,
    /// Records to skip (`$skip`).
    pub skip: Option<u32>,
}

impl ListOptions {
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    #[must_use]
    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub(crate) fn apply(&self, url: UrlTemplate) -> UrlTemplate {
        url.query_opt("$filter", self.filter.as_deref())
            .query_opt("$top", self.top)
            .query_opt("$skip", self.skip)
    }
}

/// [`ListOptions`] plus the `tags` parameter of `ApiOperationClient::list_by_api`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationListOptions {
    pub list: ListOptions,
    /// Include tags in the response.
    pub tags: Option<String>,
}

impl OperationListOptions {
    pub(crate) fn apply(&self, url: UrlTemplate) -> UrlTemplate {
        self.list.apply(url).query_opt("tags", self.tags.as_deref())
    }
}

/// Paging and ordering of report operations. `$filter` is mandatory and
/// passed separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportListOptions {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    /// `$orderby`, e.g. `callCountTotal desc`. Ignored by `list_by_geo` and
    /// `list_by_request`.
    pub orderby: Option<String>,
}

impl ReportListOptions {
    pub(crate) fn apply(&self, url: UrlTemplate, with_orderby: bool) -> UrlTemplate {
        let url = url.query_opt("$top", self.top).query_opt("$skip", self.skip);
        if with_orderby {
            url.query_opt("$orderby", self.orderby.as_deref())
        } else {
            url
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductPolicyGetOptions {
    /// Format of the returned policy, XML escaped by default.
    pub format: Option<PolicyExportFormat>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchemaDeleteOptions {
    /// Delete the schema even when operations reference it.
    pub force: Option<bool>,
}
