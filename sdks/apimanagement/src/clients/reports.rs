use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, Page, Pager, UrlTemplate};
use serde::de::DeserializeOwned;

use super::{API_VERSION, ClientCore};
use crate::models::{ReportCollection, RequestReportCollection};
use crate::options::ReportListOptions;

/// Usage reports aggregated over a time window.
///
/// Every listing takes an OData `$filter`, which the service requires and
/// which must at least bound `timestamp`, e.g.
/// `timestamp ge datetime'2017-06-01T00:00:00' and timestamp le datetime'2017-06-04T00:00:00'`.
#[derive(Clone, Debug)]
pub struct ReportsClient {
    core: ClientCore,
}

impl ReportsClient {
    /// # Errors
    /// When the pipeline cannot be built from `options`.
    pub fn new(
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
        options: &ClientOptions,
    ) -> Result<Self, ArmError> {
        Ok(Self {
            core: ClientCore::connect(subscription_id.into(), credential, options, API_VERSION)?,
        })
    }

    pub(super) fn from_core(core: ClientCore) -> Self {
        Self { core }
    }

    fn report_url(
        &self,
        path: &str,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
        with_orderby: bool,
    ) -> UrlTemplate {
        let url = self
            .core
            .service_url(path, resource_group_name, service_name)
            .query("$filter", filter);
        options.apply(url, with_orderby)
    }

    fn pages<P>(&self, url: UrlTemplate) -> Pager<P>
    where
        P: Page + DeserializeOwned + Send + 'static,
    {
        Pager::get_pages(self.core.pipeline.clone(), url.build())
    }

    pub fn list_by_api(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
    ) -> Pager<ReportCollection> {
        self.pages(self.report_url(
            service_path!("/reports/byApi"),
            resource_group_name,
            service_name,
            filter,
            options,
            true,
        ))
    }

    pub fn list_by_user(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
    ) -> Pager<ReportCollection> {
        self.pages(self.report_url(
            service_path!("/reports/byUser"),
            resource_group_name,
            service_name,
            filter,
            options,
            true,
        ))
    }

    pub fn list_by_operation(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
    ) -> Pager<ReportCollection> {
        self.pages(self.report_url(
            service_path!("/reports/byOperation"),
            resource_group_name,
            service_name,
            filter,
            options,
            true,
        ))
    }

    pub fn list_by_product(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
    ) -> Pager<ReportCollection> {
        self.pages(self.report_url(
            service_path!("/reports/byProduct"),
            resource_group_name,
            service_name,
            filter,
            options,
            true,
        ))
    }

    /// Records per country, region and zip code. Geo reports cannot be
    /// ordered, so `options.orderby` is not sent.
    pub fn list_by_geo(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
    ) -> Pager<ReportCollection> {
        self.pages(self.report_url(
            service_path!("/reports/byGeo"),
            resource_group_name,
            service_name,
            filter,
            options,
            false,
        ))
    }

    pub fn list_by_subscription(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
    ) -> Pager<ReportCollection> {
        self.pages(self.report_url(
            service_path!("/reports/bySubscription"),
            resource_group_name,
            service_name,
            filter,
            options,
            true,
        ))
    }

    /// Records bucketed by `interval`, an ISO 8601 duration that must be a
    /// multiple of 15 minutes (`PT15M`, `PT1H`, ...).
    pub fn list_by_time(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        interval: &str,
        options: &ReportListOptions,
    ) -> Pager<ReportCollection> {
        let url = self
            .report_url(
                service_path!("/reports/byTime"),
                resource_group_name,
                service_name,
                filter,
                options,
                true,
            )
            .query("interval", interval);
        self.pages(url)
    }

    /// Individual requests. The service returns these in a single page, so
    /// the pager ends after the first response unless it carries a `nextLink`.
    pub fn list_by_request(
        &self,
        resource_group_name: &str,
        service_name: &str,
        filter: &str,
        options: &ReportListOptions,
    ) -> Pager<RequestReportCollection> {
        self.pages(self.report_url(
            service_path!("/reports/byRequest"),
            resource_group_name,
            service_name,
            filter,
            options,
            false,
        ))
    }
}
