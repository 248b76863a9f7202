//! Backend access. Only create and delete exist on the wire; edits stay
//! local.

mod http;

pub use http::HttpEmployeeApi;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::{EmployeeRecord, NewEmployee, ServerId};

/// Remote call failures. None of them is retried.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{0} cannot be used as a base URL")]
    InvalidBaseUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The backend operations the registry depends on.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    /// Submits a new employee and returns the stored, canonical record.
    async fn create_employee(&self, employee: &NewEmployee) -> Result<EmployeeRecord, RemoteError>;

    /// Deletes the employee with the given server id.
    async fn delete_employee(&self, id: &ServerId) -> Result<(), RemoteError>;
}
