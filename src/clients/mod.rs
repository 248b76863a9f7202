use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::domain::{EmployeeDraft, EmployeeRecord, RecordKey};
use crate::error::RegistryError;
use crate::messages::{RegistryRequest, RegistrySnapshot};
use crate::store::FilteredEntry;

/// Generate client methods with oneshot channel boilerplate and automatic tracing.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, RegistryError> {
                debug!("Sending request");
                let (respond_to, response) = oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| RegistryError::ServiceCommunicationError("Service closed".to_string()))?;

                response.await.map_err(|_| RegistryError::ServiceCommunicationError("Service dropped".to_string()))?
            }
        }
    };
}

/// Handle to the registry service. Cheap to clone; every clone talks to the
/// same service task.
#[derive(Clone)]
pub struct RegistryClient {
    sender: mpsc::Sender<RegistryRequest>,
}

impl RegistryClient {
    pub fn new(sender: mpsc::Sender<RegistryRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        debug!("Sending shutdown request");
        self.sender
            .send(RegistryRequest::Shutdown)
            .await
            .map_err(|_| RegistryError::ServiceCommunicationError("Service closed".to_string()))
    }
}

client_method!(RegistryClient => fn create_employee(draft: EmployeeDraft) -> EmployeeRecord as RegistryRequest::CreateEmployee);
client_method!(RegistryClient => fn delete_employee(key: RecordKey) -> () as RegistryRequest::DeleteEmployee);
client_method!(RegistryClient => fn update_employee(key: RecordKey, record: EmployeeRecord) -> () as RegistryRequest::UpdateEmployee);
client_method!(RegistryClient => fn search(term: String) -> Vec<FilteredEntry> as RegistryRequest::Search);
client_method!(RegistryClient => fn snapshot() -> RegistrySnapshot as RegistryRequest::Snapshot);
