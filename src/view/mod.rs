//! Screen state and user-intent routing.
//!
//! The controller owns no employee data: the list lives in the registry
//! service and is fetched when a screen needs it. Remote actions (register,
//! delete) run in their own tasks and come back as [`Outcome`]s, so the
//! front-end keeps reading input while a call is pending. Every failure is
//! turned into a [`Notice`] here and never propagates past the action that
//! caused it.

mod notice;

pub use notice::{Confirmer, Decision, Notice, NoticeKind, Notifier, Prompt};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, info_span, instrument, warn, Instrument};

use crate::clients::RegistryClient;
use crate::domain::{EmployeeDraft, EmployeeRecord, Field, RecordKey};
use crate::error::RegistryError;
use crate::store::FilteredEntry;
use crate::validation::{validate, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Registration,
    List,
}

/// Registration form state: the draft plus its inline field errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub draft: EmployeeDraft,
    pub errors: ValidationErrors,
}

/// Edit overlay for one record. Shown over whichever screen is active until
/// it is confirmed or cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub key: RecordKey,
    pub original: EmployeeRecord,
    pub draft: EmployeeDraft,
    pub errors: ValidationErrors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldRejected {
    #[error("Open the registration form or edit a row first.")]
    NoForm,
    #[error("The photo cannot be changed while editing.")]
    PhotoWhileEditing,
}

/// A finished remote action, applied with [`ViewController::apply`].
#[derive(Debug)]
pub enum Outcome {
    Registered {
        submitted: EmployeeDraft,
        result: Result<EmployeeRecord, RegistryError>,
    },
    Deleted {
        key: RecordKey,
        result: Result<(), RegistryError>,
    },
}

pub struct ViewController<C, N> {
    client: RegistryClient,
    confirmer: C,
    notifier: N,
    screen: Screen,
    form: RegistrationForm,
    edit: Option<EditSession>,
    outcome_sender: mpsc::UnboundedSender<Outcome>,
    outcomes: mpsc::UnboundedReceiver<Outcome>,
    pending: usize,
}

impl<C: Confirmer, N: Notifier> ViewController<C, N> {
    pub fn new(client: RegistryClient, confirmer: C, notifier: N) -> Self {
        let (outcome_sender, outcomes) = mpsc::unbounded_channel();
        Self {
            client,
            confirmer,
            notifier,
            screen: Screen::Registration,
            form: RegistrationForm::default(),
            edit: None,
            outcome_sender,
            outcomes,
            pending: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Remote actions started but not yet applied.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn show_registration(&mut self) {
        self.screen = Screen::Registration;
    }

    pub fn show_list(&mut self) {
        self.screen = Screen::List;
    }

    /// Sets a field on the edit overlay when one is open, otherwise on the
    /// registration form.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), FieldRejected> {
        if let Some(session) = self.edit.as_mut() {
            if field == Field::Photo {
                return Err(FieldRejected::PhotoWhileEditing);
            }
            session.draft.set_field(field, value);
            return Ok(());
        }
        if self.screen == Screen::Registration {
            self.form.draft.set_field(field, value);
            return Ok(());
        }
        Err(FieldRejected::NoForm)
    }

    pub fn clear_form(&mut self) {
        self.form = RegistrationForm::default();
    }

    /// Validates the registration form and, when it passes, sends it in the
    /// background. Returns whether a request was sent.
    #[instrument(skip(self), fields(id_number = %self.form.draft.id_number))]
    pub fn submit(&mut self) -> bool {
        let errors = validate(&self.form.draft);
        if !errors.is_empty() {
            self.reject_form(errors);
            return false;
        }
        self.form.errors = ValidationErrors::default();

        let client = self.client.clone();
        let outcomes = self.outcome_sender.clone();
        let submitted = self.form.draft.clone();
        let span = info_span!("register", id_number = %submitted.id_number);
        self.pending += 1;
        tokio::spawn(
            async move {
                let result = client.create_employee(submitted.clone()).await;
                let _ = outcomes.send(Outcome::Registered { submitted, result });
            }
            .instrument(span),
        );
        true
    }

    fn reject_form(&mut self, errors: ValidationErrors) {
        warn!(failed_fields = errors.len(), "Registration form rejected");
        self.form.errors = errors;
        self.notifier.notify(Notice::warning(
            "Validation Error",
            "Please correct the highlighted errors before submitting.",
        ));
    }

    /// Applies a search term and returns the rows to display.
    #[instrument(skip(self))]
    pub async fn search(&mut self, term: &str) -> Vec<FilteredEntry> {
        match self.client.search(term.to_string()).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Search failed");
                self.notifier.notify(Notice::error("Error", format!("Search failed: {e}")));
                Vec::new()
            }
        }
    }

    /// Rows of the current filtered view.
    pub async fn rows(&mut self) -> Vec<FilteredEntry> {
        match self.client.snapshot().await {
            Ok(snapshot) => snapshot.filtered,
            Err(e) => {
                error!(error = %e, "Could not load employees");
                self.notifier.notify(Notice::error("Error", format!("Could not load employees: {e}")));
                Vec::new()
            }
        }
    }

    /// Opens the edit overlay for a displayed row.
    pub fn select_edit(&mut self, row: &FilteredEntry) {
        self.edit = Some(EditSession {
            key: row.key.clone(),
            original: row.record.clone(),
            draft: EmployeeDraft::from_record(&row.record),
            errors: ValidationErrors::default(),
        });
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Validates the overlay and replaces the record locally. The overlay
    /// stays open when validation or the update fails.
    #[instrument(skip(self))]
    pub async fn confirm_edit(&mut self) -> bool {
        let Some(session) = self.edit.as_mut() else {
            return false;
        };

        let record = match session.draft.apply_to(&session.original) {
            Ok(record) => record,
            Err(errors) => {
                warn!(failed_fields = errors.len(), "Edit rejected");
                session.errors = errors;
                self.notifier.notify(Notice::warning(
                    "Validation Error",
                    "Please correct the highlighted errors before saving.",
                ));
                return false;
            }
        };

        match self.client.update_employee(session.key.clone(), record).await {
            Ok(()) => {
                info!(key = %session.key, "Employee updated");
                self.edit = None;
                self.notifier.notify(Notice::success("Employee Updated", "The changes have been saved."));
                true
            }
            Err(e) => {
                error!(error = %e, "Update failed");
                if matches!(e, RegistryError::StaleRecord(_)) {
                    self.edit = None;
                }
                self.notifier.notify(Notice::error("Error", format!("Failed to update the employee. ({e})")));
                false
            }
        }
    }

    /// Asks for confirmation, then deletes the row's record in the
    /// background. Declining changes nothing. Returns whether a request was
    /// sent.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn delete(&mut self, key: RecordKey) -> bool {
        let prompt = Prompt {
            title: "Are you sure?".to_string(),
            text: "You won't be able to revert this!".to_string(),
            confirm_label: "Yes, delete it!".to_string(),
        };
        if self.confirmer.confirm(&prompt).await == Decision::Decline {
            info!("Delete declined");
            return false;
        }

        let client = self.client.clone();
        let outcomes = self.outcome_sender.clone();
        let span = info_span!("delete", key = %key);
        self.pending += 1;
        tokio::spawn(
            async move {
                let result = client.delete_employee(key.clone()).await;
                let _ = outcomes.send(Outcome::Deleted { key, result });
            }
            .instrument(span),
        );
        true
    }

    /// Waits for the next remote action to finish. `None` when nothing is
    /// pending.
    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.outcomes.recv().await?;
        self.pending -= 1;
        Some(outcome)
    }

    /// Reports a finished action. A registration clears the form only if it
    /// still holds the submitted draft, so input typed meanwhile survives.
    /// Returns whether the action succeeded.
    pub fn apply(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Registered { submitted, result } => {
                let unchanged = self.form.draft == submitted;
                match result {
                    Ok(record) => {
                        info!(id_number = %record.id_number, "Employee registered");
                        if unchanged {
                            self.clear_form();
                        }
                        self.notifier.notify(Notice::success(
                            "Employee Registered",
                            "The employee has been successfully added.",
                        ));
                        true
                    }
                    Err(RegistryError::Validation(errors)) if unchanged => {
                        self.reject_form(errors);
                        false
                    }
                    Err(e) => {
                        error!(error = %e, "Registration failed");
                        self.notifier.notify(Notice::error(
                            "Error",
                            format!("Failed to register employee. Please try again. ({e})"),
                        ));
                        false
                    }
                }
            }
            Outcome::Deleted { key, result } => match result {
                Ok(()) => {
                    info!(key = %key, "Employee deleted");
                    self.notifier.notify(Notice::success("Deleted!", "Employee has been deleted."));
                    true
                }
                Err(e) => {
                    error!(key = %key, error = %e, "Delete failed");
                    self.notifier.notify(Notice::error("Error!", format!("Failed to delete the employee. ({e})")));
                    false
                }
            },
        }
    }

    /// Applies every pending action as it lands.
    pub async fn settle(&mut self) {
        while let Some(outcome) = self.next_outcome().await {
            self.apply(outcome);
        }
    }
}
