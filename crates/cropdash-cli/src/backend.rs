use crate::cli::ClientBackend;
use anyhow::Result;
use cropdash_client::{HttpRemoteClient, MemoryRemoteClient};
use cropdash_core::config::LayeredConfig;
use cropdash_core::ports::RemoteClient;
use std::sync::Arc;

/// Shared handle every command drives the orchestration layer with
pub type Client = Arc<dyn RemoteClient>;

/// Create the backend selected on the command line
pub fn create_client(backend: ClientBackend, config: &LayeredConfig) -> Result<Client> {
    match backend {
        ClientBackend::Http => {
            let client = HttpRemoteClient::new(&config.base_url.value)?;
            tracing::debug!(base_url = client.base_url(), "Using HTTP backend");
            Ok(Arc::new(client))
        }
        ClientBackend::Memory => {
            tracing::debug!("Using in-memory fixture backend");
            Ok(Arc::new(MemoryRemoteClient::with_fixtures()))
        }
    }
}
