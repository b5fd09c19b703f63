use anyhow::{Context, Result};
use armapimanagement::{ListOptions, Page, Pager};
use clap::Args;
use serde::Serialize;

/// The API Management instance a command targets.
#[derive(Args)]
pub struct ServiceArgs {
    /// Resource group of the service
    #[arg(short = 'g', long)]
    pub resource_group: String,
    /// Name of the API Management service
    #[arg(short = 's', long)]
    pub service: String,
}

/// OData paging for list commands.
#[derive(Args)]
pub struct ListArgs {
    /// OData `$filter` expression
    #[arg(long)]
    pub filter: Option<String>,
    /// Page size
    #[arg(long)]
    pub top: Option<u32>,
    /// Records to skip
    #[arg(long)]
    pub skip: Option<u32>,
}

impl ListArgs {
    #[must_use]
    pub fn options(&self) -> ListOptions {
        ListOptions {
            filter: self.filter.clone(),
            top: self.top,
            skip: self.skip,
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}

/// Drain `pager` and print every item as one JSON array.
pub async fn print_all<P>(pager: Pager<P>) -> Result<()>
where
    P: Page + Send + 'static,
    P::Item: Serialize + Send + 'static,
{
    let items = pager.collect_all().await.context("listing")?;
    tracing::info!(count = items.len(), "listing complete");
    print_json(&items)
}
