use std::sync::Arc;

use tracing::{error, info, instrument};

use super::RegistryConfig;
use crate::actors::RegistryService;
use crate::clients::RegistryClient;
use crate::remote::{EmployeeApi, HttpEmployeeApi, RemoteError};

/// Starts the registry service, hands out its client, and shuts it down.
pub struct RegistrySystem {
    pub registry_client: RegistryClient,
    handle: tokio::task::JoinHandle<()>,
}

impl RegistrySystem {
    /// Starts the service against the HTTP backend described by `config`.
    #[instrument(name = "registry_system", skip(config), fields(base_url = %config.base_url))]
    pub fn new(config: &RegistryConfig) -> Result<Self, RemoteError> {
        let api = HttpEmployeeApi::new(config)?;
        Ok(Self::with_api(config.buffer_size, Arc::new(api)))
    }

    /// Starts the service against any backend implementation.
    pub fn with_api(buffer_size: usize, api: Arc<dyn EmployeeApi>) -> Self {
        info!("Starting registry system");

        let (service, registry_client) = RegistryService::new(buffer_size, api);
        let handle = tokio::spawn(service.run());

        info!("Registry system started successfully");
        Self { registry_client, handle }
    }

    /// Stops accepting requests and waits for in-flight remote calls.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down registry system");

        let _ = self.registry_client.shutdown().await;
        drop(self.registry_client);

        if let Err(e) = self.handle.await {
            error!(error = ?e, "Service shutdown error");
            return Err(format!("Registry service failed: {e:?}"));
        }

        info!("Registry system shutdown complete");
        Ok(())
    }
}
