use anyhow::{Context, Result};
use armapimanagement::ClientFactory;
use armapimanagement::models::BackendReconnectContract;
use clap::Subcommand;

use crate::common::{ListArgs, ServiceArgs, print_all, print_json};

#[derive(Subcommand)]
pub enum BackendCommand {
    /// List the backends of a service
    List {
        #[command(flatten)]
        service: ServiceArgs,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one backend and its entity tag
    Get {
        #[command(flatten)]
        service: ServiceArgs,
        backend_id: String,
    },
    /// Make the gateway reopen its connections to a backend
    Reconnect {
        #[command(flatten)]
        service: ServiceArgs,
        backend_id: String,
        /// Delay before reconnecting, as an ISO 8601 duration (`PT2M` to `PT2H`)
        #[arg(long)]
        after: Option<String>,
    },
}

impl BackendCommand {
    pub async fn run(self, factory: &ClientFactory) -> Result<()> {
        let client = factory.backend_client();
        match self {
            Self::List { service, list } => {
                print_all(client.list_by_service(
                    &service.resource_group,
                    &service.service,
                    &list.options(),
                ))
                .await
            }
            Self::Get {
                service,
                backend_id,
            } => {
                let backend = client
                    .get(&service.resource_group, &service.service, &backend_id)
                    .await
                    .with_context(|| format!("reading backend {backend_id}"))?;
                if let Some(etag) = &backend.etag {
                    tracing::info!(%etag, "backend version");
                }
                print_json(&backend.value)
            }
            Self::Reconnect {
                service,
                backend_id,
                after,
            } => {
                let parameters = after.map(BackendReconnectContract::after);
                client
                    .reconnect(
                        &service.resource_group,
                        &service.service,
                        &backend_id,
                        parameters.as_ref(),
                    )
                    .await
                    .with_context(|| format!("reconnecting backend {backend_id}"))?;
                println!("reconnect of {backend_id} accepted");
                Ok(())
            }
        }
    }
}
