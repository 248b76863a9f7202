use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use tracing::{debug, instrument};

use super::{EmployeeApi, RemoteError};
use crate::app_system::RegistryConfig;
use crate::domain::{EmployeeRecord, NewEmployee, ServerId};

/// `EmployeeApi` over the backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpEmployeeApi {
    client: Client,
    base_url: Url,
}

impl HttpEmployeeApi {
    pub fn new(config: &RegistryConfig) -> Result<Self, RemoteError> {
        if config.base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidBaseUrl(config.base_url.to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Appends path segments to the base URL, escaping each one.
    /// `new` only accepts base URLs, so the segments are always applied.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Any non-2xx status is a failure.
    async fn check_status(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status { status, body })
    }
}

#[async_trait]
impl EmployeeApi for HttpEmployeeApi {
    #[instrument(skip(self, employee), fields(id_number = %employee.id_number))]
    async fn create_employee(&self, employee: &NewEmployee) -> Result<EmployeeRecord, RemoteError> {
        let url = self.endpoint(&["addEmployee"]);
        debug!(%url, "Sending request");

        let response = self.client.post(url).json(employee).send().await?;
        let body = Self::check_status(response).await?.bytes().await?;
        if body.is_empty() {
            return Err(RemoteError::InvalidResponse("empty body from addEmployee".to_string()));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_employee(&self, id: &ServerId) -> Result<(), RemoteError> {
        let url = self.endpoint(&["deleteEmployee", id.as_str()]);
        debug!(%url, "Sending request");

        let response = self.client.delete(url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
