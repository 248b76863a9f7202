use thiserror::Error;

use crate::domain::RecordKey;
use crate::remote::RemoteError;
use crate::store::StoreError;
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Employee validation error: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Remote call failed: {0}")]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Record {0} is no longer in the list")]
    StaleRecord(RecordKey),
    #[error("Employee {0} has no server id and cannot be deleted remotely")]
    MissingServerId(String),
    #[error("Service communication error: {0}")]
    ServiceCommunicationError(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
