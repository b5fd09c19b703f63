use anyhow::{Result, bail};
use armapimanagement::{ClientFactory, ReportListOptions};
use clap::{Args, ValueEnum};

use crate::common::{ServiceArgs, print_all};

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportKind {
    Api,
    User,
    Operation,
    Product,
    Geo,
    Subscription,
    Time,
    Request,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Aggregation of the report
    #[arg(value_enum)]
    kind: ReportKind,
    #[command(flatten)]
    service: ServiceArgs,
    /// OData `$filter`; must bound `timestamp`
    #[arg(long)]
    filter: String,
    /// Bucket size for `time` reports, e.g. `PT15M`
    #[arg(long)]
    interval: Option<String>,
    #[arg(long)]
    top: Option<u32>,
    #[arg(long)]
    skip: Option<u32>,
    /// OData `$orderby`, not supported by `geo` and `request`
    #[arg(long)]
    orderby: Option<String>,
}

impl ReportArgs {
    pub async fn run(self, factory: &ClientFactory) -> Result<()> {
        let client = factory.reports_client();
        let options = ReportListOptions {
            top: self.top,
            skip: self.skip,
            orderby: self.orderby,
        };
        let (group, service, filter) = (
            self.service.resource_group.as_str(),
            self.service.service.as_str(),
            self.filter.as_str(),
        );
        match self.kind {
            ReportKind::Api => print_all(client.list_by_api(group, service, filter, &options)).await,
            ReportKind::User => {
                print_all(client.list_by_user(group, service, filter, &options)).await
            }
            ReportKind::Operation => {
                print_all(client.list_by_operation(group, service, filter, &options)).await
            }
            ReportKind::Product => {
                print_all(client.list_by_product(group, service, filter, &options)).await
            }
            ReportKind::Geo => print_all(client.list_by_geo(group, service, filter, &options)).await,
            ReportKind::Subscription => {
                print_all(client.list_by_subscription(group, service, filter, &options)).await
            }
            ReportKind::Time => {
                let Some(interval) = self.interval.as_deref() else {
                    bail!("time reports need --interval");
                };
                print_all(client.list_by_time(group, service, filter, interval, &options)).await
            }
            ReportKind::Request => {
                print_all(client.list_by_request(group, service, filter, &options)).await
            }
        }
    }
}
