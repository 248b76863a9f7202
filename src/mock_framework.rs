//! # Mock Framework
//!
//! Scripted stand-in for the backend, used to test the registry service and
//! the view controller without a network.
//!
//! Calls that have nothing scripted succeed: creates echo the payload back
//! with a fresh id (`emp_1`, `emp_2`, ...) and deletes return `Ok(())`.
//! Use [`MockEmployeeApi::fail_next_create`] and friends to script failures,
//! or the `gate_next_*` helpers to hold a call open until the test releases
//! it, which is how out-of-order completions are simulated.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::oneshot;

use crate::domain::{EmployeeRecord, NewEmployee, ServerId};
use crate::remote::{EmployeeApi, RemoteError};

enum Scripted<T> {
    Now(Result<T, RemoteError>),
    Gated(oneshot::Receiver<Result<T, RemoteError>>),
}

impl<T> Scripted<T> {
    async fn resolve(self) -> Result<T, RemoteError> {
        match self {
            Scripted::Now(result) => result,
            Scripted::Gated(gate) => gate
                .await
                .unwrap_or_else(|_| Err(RemoteError::InvalidResponse("gate dropped".to_string()))),
        }
    }
}

#[derive(Default)]
struct MockState {
    creates: VecDeque<Scripted<EmployeeRecord>>,
    deletes: VecDeque<Scripted<()>>,
    created: Vec<NewEmployee>,
    deleted: Vec<ServerId>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct MockEmployeeApi {
    state: Arc<Mutex<MockState>>,
}

pub fn server_failure() -> RemoteError {
    RemoteError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "backend unavailable".to_string(),
    }
}

impl MockEmployeeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_create(&self) {
        self.state.lock().unwrap().creates.push_back(Scripted::Now(Err(server_failure())));
    }

    pub fn fail_next_delete(&self) {
        self.state.lock().unwrap().deletes.push_back(Scripted::Now(Err(server_failure())));
    }

    /// The next create waits until the returned sender fires.
    pub fn gate_next_create(&self) -> oneshot::Sender<Result<EmployeeRecord, RemoteError>> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().creates.push_back(Scripted::Gated(rx));
        tx
    }

    /// The next delete waits until the returned sender fires.
    pub fn gate_next_delete(&self) -> oneshot::Sender<Result<(), RemoteError>> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().deletes.push_back(Scripted::Gated(rx));
        tx
    }

    pub fn created(&self) -> Vec<NewEmployee> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn deleted(&self) -> Vec<ServerId> {
        self.state.lock().unwrap().deleted.clone()
    }
}

/// What a well-behaved backend answers to `employee`.
pub fn echo_record(id: &str, employee: &NewEmployee) -> EmployeeRecord {
    EmployeeRecord {
        id: Some(ServerId::new(id)),
        name: employee.name.clone(),
        surname: employee.surname.clone(),
        age: employee.age,
        id_number: employee.id_number.clone(),
        role: employee.role.clone(),
    }
}

#[async_trait]
impl EmployeeApi for MockEmployeeApi {
    async fn create_employee(&self, employee: &NewEmployee) -> Result<EmployeeRecord, RemoteError> {
        let scripted = {
            let mut state = self.state.lock().unwrap();
            state.created.push(employee.clone());
            state.next_id += 1;
            let id = format!("emp_{}", state.next_id);
            state
                .creates
                .pop_front()
                .unwrap_or_else(|| Scripted::Now(Ok(echo_record(&id, employee))))
        };
        scripted.resolve().await
    }

    async fn delete_employee(&self, id: &ServerId) -> Result<(), RemoteError> {
        let scripted = {
            let mut state = self.state.lock().unwrap();
            state.deleted.push(id.clone());
            state.deletes.pop_front().unwrap_or(Scripted::Now(Ok(())))
        };
        scripted.resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_employee() -> NewEmployee {
        NewEmployee {
            name: "Test".to_string(),
            surname: "User".to_string(),
            age: 30,
            id_number: "1234567890123".to_string(),
            role: "Tester".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_api_echoes_and_scripts_failures() {
        let api = MockEmployeeApi::new();

        let record = api.create_employee(&new_employee()).await.unwrap();
        assert_eq!(record.id, Some(ServerId::new("emp_1")));
        assert_eq!(record.name, "Test");

        api.fail_next_create();
        assert!(api.create_employee(&new_employee()).await.is_err());
        assert_eq!(api.created().len(), 2);
    }

    #[tokio::test]
    async fn test_gated_delete_waits_for_release() {
        let api = MockEmployeeApi::new();
        let gate = api.gate_next_delete();

        let task = {
            let api = api.clone();
            tokio::spawn(async move { api.delete_employee(&ServerId::new("emp_9")).await })
        };

        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.send(Ok(())).unwrap();
        assert!(task.await.unwrap().is_ok());
        assert_eq!(api.deleted(), vec![ServerId::new("emp_9")]);
    }
}
