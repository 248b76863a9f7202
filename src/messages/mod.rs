use tokio::sync::oneshot;

use crate::domain::{EmployeeDraft, EmployeeRecord, RecordKey};
use crate::error::RegistryError;
use crate::store::FilteredEntry;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Everything a view needs to render the list screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub records: Vec<EmployeeRecord>,
    pub filtered: Vec<FilteredEntry>,
    pub search_term: String,
    /// Remote calls issued but not yet completed.
    pub in_flight: usize,
}

/// Typed messages for the registry service. Each variant includes its
/// parameters and a oneshot channel for the response.
#[derive(Debug)]
pub enum RegistryRequest {
    CreateEmployee {
        draft: EmployeeDraft,
        respond_to: ServiceResponse<EmployeeRecord, RegistryError>,
    },
    DeleteEmployee {
        key: RecordKey,
        respond_to: ServiceResponse<(), RegistryError>,
    },
    UpdateEmployee {
        key: RecordKey,
        record: EmployeeRecord,
        respond_to: ServiceResponse<(), RegistryError>,
    },
    Search {
        term: String,
        respond_to: ServiceResponse<Vec<FilteredEntry>, RegistryError>,
    },
    Snapshot {
        respond_to: ServiceResponse<RegistrySnapshot, RegistryError>,
    },
    Shutdown,
}
