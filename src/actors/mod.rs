use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

use crate::clients::RegistryClient;
use crate::domain::{EmployeeDraft, EmployeeRecord, RecordKey};
use crate::error::RegistryError;
use crate::messages::{RegistryRequest, RegistrySnapshot, ServiceResponse};
use crate::remote::{EmployeeApi, RemoteError};
use crate::store::{FilteredEntry, RecordStore};

/// Macro for clean error response handling
macro_rules! send_error {
    ($respond_to:expr, $error:expr) => {{
        let _ = $respond_to.send(Err($error));
        return;
    }};
}

/// A finished remote call, fed back into the service loop so it is applied
/// against the state current at completion time.
enum Completion {
    Created {
        token: u64,
        result: Result<EmployeeRecord, RemoteError>,
        respond_to: ServiceResponse<EmployeeRecord, RegistryError>,
    },
    Deleted {
        token: u64,
        key: RecordKey,
        result: Result<(), RemoteError>,
        respond_to: ServiceResponse<(), RegistryError>,
    },
}

// =============================================================================
// REGISTRY SERVICE
// =============================================================================

/// Sole owner of the employee list.
///
/// Requests are handled one at a time in arrival order. Remote calls run in
/// their own tasks so searches and edits are still answered while a call is
/// pending; each carries a monotonic request token and its completion is
/// applied when it arrives. Last write wins by completion time, not issuance
/// time.
pub struct RegistryService {
    receiver: mpsc::Receiver<RegistryRequest>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_sender: mpsc::UnboundedSender<Completion>,
    api: Arc<dyn EmployeeApi>,
    store: RecordStore,
    next_token: u64,
    in_flight: usize,
}

impl RegistryService {
    pub fn new(buffer_size: usize, api: Arc<dyn EmployeeApi>) -> (Self, RegistryClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (completion_sender, completions) = mpsc::unbounded_channel();
        let service = Self {
            receiver,
            completions,
            completion_sender,
            api,
            store: RecordStore::new(),
            next_token: 1,
            in_flight: 0,
        };
        let client = RegistryClient::new(sender);
        (service, client)
    }

    #[instrument(name = "registry_service", skip(self))]
    pub async fn run(mut self) {
        info!("RegistryService starting");

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(RegistryRequest::Shutdown) | None => break,
                    Some(request) => self.handle_request(request),
                },
                Some(completion) = self.completions.recv() => self.handle_completion(completion),
            }
        }

        // In-flight calls cannot be cancelled; let them land before stopping.
        if self.in_flight > 0 {
            info!(in_flight = self.in_flight, "Waiting for in-flight remote calls");
        }
        while self.in_flight > 0 {
            match self.completions.recv().await {
                Some(completion) => self.handle_completion(completion),
                None => break,
            }
        }

        info!(records = self.store.len(), "RegistryService stopped");
    }

    fn handle_request(&mut self, request: RegistryRequest) {
        match request {
            RegistryRequest::CreateEmployee { draft, respond_to } => {
                self.handle_create_employee(draft, respond_to);
            }
            RegistryRequest::DeleteEmployee { key, respond_to } => {
                self.handle_delete_employee(key, respond_to);
            }
            RegistryRequest::UpdateEmployee { key, record, respond_to } => {
                self.handle_update_employee(key, record, respond_to);
            }
            RegistryRequest::Search { term, respond_to } => {
                self.handle_search(term, respond_to);
            }
            RegistryRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(Ok(self.snapshot()));
            }
            RegistryRequest::Shutdown => {}
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Created { token, result, respond_to } => {
                self.handle_created(token, result, respond_to);
            }
            Completion::Deleted { token, key, result, respond_to } => {
                self.handle_deleted(token, key, result, respond_to);
            }
        }
    }

    fn issue_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        self.in_flight += 1;
        token
    }

    #[instrument(fields(id_number = %draft.id_number), skip(self, draft, respond_to))]
    fn handle_create_employee(
        &mut self,
        draft: EmployeeDraft,
        respond_to: ServiceResponse<EmployeeRecord, RegistryError>,
    ) {
        debug!("Processing create_employee request");

        let employee = match draft.to_new_employee() {
            Ok(employee) => employee,
            Err(errors) => {
                warn!(failed_fields = errors.len(), "Validation failed");
                send_error!(respond_to, errors.into());
            }
        };

        let token = self.issue_token();
        let api = Arc::clone(&self.api);
        let completions = self.completion_sender.clone();
        tokio::spawn(
            async move {
                debug!("Calling backend");
                let result = api.create_employee(&employee).await;
                let _ = completions.send(Completion::Created { token, result, respond_to });
            }
            .instrument(info_span!("remote_create", token)),
        );
    }

    #[instrument(skip(self, result, respond_to))]
    fn handle_created(
        &mut self,
        token: u64,
        result: Result<EmployeeRecord, RemoteError>,
        respond_to: ServiceResponse<EmployeeRecord, RegistryError>,
    ) {
        match result {
            Ok(record) => {
                self.store.add(record.clone());
                info!(position = self.store.len() - 1, id_number = %record.id_number, "Employee created");
                let _ = respond_to.send(Ok(record));
            }
            Err(e) => {
                error!(error = %e, "Create failed on backend");
                let _ = respond_to.send(Err(e.into()));
            }
        }
    }

    #[instrument(fields(key = %key), skip(self, key, respond_to))]
    fn handle_delete_employee(&mut self, key: RecordKey, respond_to: ServiceResponse<(), RegistryError>) {
        debug!("Processing delete_employee request");

        let Some(position) = self.store.resolve(&key) else {
            warn!("Record to delete is gone");
            send_error!(respond_to, RegistryError::StaleRecord(key));
        };
        let record = &self.store.records()[position];
        let Some(id) = record.id.clone() else {
            warn!("Record has no server id");
            send_error!(respond_to, RegistryError::MissingServerId(record.id_number.clone()));
        };
        let key = record.key(position);

        let token = self.issue_token();
        let api = Arc::clone(&self.api);
        let completions = self.completion_sender.clone();
        tokio::spawn(
            async move {
                debug!("Calling backend");
                let result = api.delete_employee(&id).await;
                let _ = completions.send(Completion::Deleted { token, key, result, respond_to });
            }
            .instrument(info_span!("remote_delete", token)),
        );
    }

    #[instrument(fields(key = %key), skip(self, key, result, respond_to))]
    fn handle_deleted(
        &mut self,
        token: u64,
        key: RecordKey,
        result: Result<(), RemoteError>,
        respond_to: ServiceResponse<(), RegistryError>,
    ) {
        if let Err(e) = result {
            error!(error = %e, "Delete failed on backend");
            send_error!(respond_to, e.into());
        }

        // Earlier completions may have shifted the record since issuance.
        let result = match self.store.resolve(&key) {
            Some(position) => self.store.remove(position).map(|removed| {
                info!(position, id_number = %removed.id_number, "Employee deleted");
            }),
            None => {
                debug!("Record already removed locally");
                Ok(())
            }
        };
        let _ = respond_to.send(result.map_err(Into::into));
    }

    #[instrument(fields(key = %key), skip(self, key, record, respond_to))]
    fn handle_update_employee(
        &mut self,
        key: RecordKey,
        record: EmployeeRecord,
        respond_to: ServiceResponse<(), RegistryError>,
    ) {
        debug!("Processing update_employee request");

        let Some(position) = self.store.resolve(&key) else {
            warn!("Record to update is gone");
            send_error!(respond_to, RegistryError::StaleRecord(key));
        };
        let result = self.store.update(position, record).map(|_| {
            info!(position, "Employee updated locally");
        });
        let _ = respond_to.send(result.map_err(Into::into));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_search(&mut self, term: String, respond_to: ServiceResponse<Vec<FilteredEntry>, RegistryError>) {
        debug!("Processing search request");
        self.store.search(&term);
        let filtered = self.store.filtered();
        info!(matches = filtered.len(), "Search applied");
        let _ = respond_to.send(Ok(filtered));
    }

    fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            records: self.store.records().to_vec(),
            filtered: self.store.filtered(),
            search_term: self.store.search_term().to_string(),
            in_flight: self.in_flight,
        }
    }
}
