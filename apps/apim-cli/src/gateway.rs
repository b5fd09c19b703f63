use anyhow::{Context, Result};
use armapimanagement::ClientFactory;
use clap::Subcommand;

use crate::common::{print_all, print_json};

#[derive(Subcommand)]
pub enum GatewayCommand {
    /// List gateways of the subscription, or of one resource group
    List {
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
    },
    /// Show one gateway
    Get {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
    },
    /// Delete a gateway and wait for the deletion to finish
    Delete {
        #[arg(short = 'g', long)]
        resource_group: String,
        name: String,
        /// Print a resume token instead of waiting
        #[arg(long)]
        no_wait: bool,
    },
    /// Wait for a deletion started with `delete --no-wait`
    ResumeDelete { token: String },
}

impl GatewayCommand {
    pub async fn run(self, factory: &ClientFactory) -> Result<()> {
        let client = factory.api_gateway_client();
        match self {
            Self::List { resource_group } => match resource_group {
                Some(group) => print_all(client.list_by_resource_group(&group)).await,
                None => print_all(client.list()).await,
            },
            Self::Get {
                resource_group,
                name,
            } => {
                let gateway = client
                    .get(&resource_group, &name)
                    .await
                    .with_context(|| format!("reading gateway {name}"))?;
                print_json(&gateway)
            }
            Self::Delete {
                resource_group,
                name,
                no_wait,
            } => {
                let mut poller = client
                    .begin_delete(&resource_group, &name)
                    .await
                    .with_context(|| format!("deleting gateway {name}"))?;
                if no_wait && !poller.done() {
                    println!("{}", poller.resume_token()?);
                    return Ok(());
                }
                poller
                    .poll_until_done(None)
                    .await
                    .with_context(|| format!("waiting for gateway {name} to be deleted"))?;
                println!("gateway {name} deleted");
                Ok(())
            }
            Self::ResumeDelete { token } => {
                let mut poller = client.resume_delete(&token)?;
                poller
                    .poll_until_done(None)
                    .await
                    .context("waiting for the gateway deletion")?;
                println!("gateway deleted");
                Ok(())
            }
        }
    }
}
