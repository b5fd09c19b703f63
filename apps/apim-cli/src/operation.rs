use anyhow::{Context, Result};
use armapimanagement::{ClientFactory, OperationListOptions};
use clap::Subcommand;

use crate::common::{ListArgs, ServiceArgs, print_all, print_json};

#[derive(Subcommand)]
pub enum OperationCommand {
    /// List the operations of an API
    List {
        #[command(flatten)]
        service: ServiceArgs,
        #[arg(long)]
        api: String,
        #[command(flatten)]
        list: ListArgs,
        /// Include operation tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Print the entity tag of an operation
    Etag {
        #[command(flatten)]
        service: ServiceArgs,
        #[arg(long)]
        api: String,
        operation_id: String,
    },
}

impl OperationCommand {
    pub async fn run(self, factory: &ClientFactory) -> Result<()> {
        let client = factory.api_operation_client();
        match self {
            Self::List {
                service,
                api,
                list,
                tags,
            } => {
                let options = OperationListOptions {
                    list: list.options(),
                    tags,
                };
                print_all(client.list_by_api(
                    &service.resource_group,
                    &service.service,
                    &api,
                    &options,
                ))
                .await
            }
            Self::Etag {
                service,
                api,
                operation_id,
            } => {
                let tag = client
                    .get_entity_tag(&service.resource_group, &service.service, &api, &operation_id)
                    .await
                    .with_context(|| format!("reading operation {operation_id}"))?;
                print_json(&tag.etag)
            }
        }
    }
}
