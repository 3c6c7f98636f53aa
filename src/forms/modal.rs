//! Create/edit modal state machine
//!
//! `Closed -> Open(Create | Edit(id)) -> Submitting -> Closed`. A failed
//! validation keeps the modal open with field errors; a failed request
//! returns it to `Open` with the form untouched.

use std::fmt;
use std::future::Future;
use tracing::debug;
use crate::notify::{Notification, Notifier};
use crate::utils::errors::{ConsoleError, FieldErrors, Result};
use super::field::{validate_fields, FieldCheck};

/// Whether the modal creates a new entity or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open(ModalMode),
    Submitting(ModalMode),
}

impl fmt::Display for ModalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalState::Closed => write!(f, "closed"),
            ModalState::Open(ModalMode::Create) => write!(f, "open(create)"),
            ModalState::Open(ModalMode::Edit(id)) => write!(f, "open(edit {})", id),
            ModalState::Submitting(_) => write!(f, "submitting"),
        }
    }
}

/// Form state of one resource
pub trait ResourceForm: Default + Clone {
    type Entity;
    type Create;
    type Update;

    /// Resource name used in notifications and logs
    const RESOURCE: &'static str;

    /// Seed the form from an existing entity
    fn from_entity(entity: &Self::Entity) -> Self;

    /// Field checks for the given mode
    fn fields(&self, mode: &ModalMode) -> Vec<FieldCheck<'_>>;

    fn create_request(&self) -> Self::Create;

    fn update_request(&self, id: &str) -> Self::Update;

    fn validate(&self, mode: &ModalMode) -> FieldErrors {
        validate_fields(&self.fields(mode))
    }
}

/// Validated request handed out by [`Modal::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<C, U> {
    Create(C),
    Update { id: String, body: U },
}

/// Generic create/edit modal
#[derive(Debug, Clone)]
pub struct Modal<F: ResourceForm> {
    state: ModalState,
    form: F,
    errors: FieldErrors,
}

impl<F: ResourceForm> Default for Modal<F> {
    fn default() -> Self {
        Self {
            state: ModalState::Closed,
            form: F::default(),
            errors: FieldErrors::new(),
        }
    }
}

impl<F: ResourceForm> Modal<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Mutable form access while the modal is open
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self.state {
            ModalState::Open(_) => Some(&mut self.form),
            _ => None,
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Open with an empty form
    pub fn open_create(&mut self) -> Result<()> {
        self.open_create_with(F::default())
    }

    /// Open for creation with preset values
    pub fn open_create_with(&mut self, form: F) -> Result<()> {
        self.ensure_closed(ModalState::Open(ModalMode::Create))?;
        self.form = form;
        self.errors.clear();
        self.state = ModalState::Open(ModalMode::Create);
        debug!(resource = F::RESOURCE, "Modal opened for create");
        Ok(())
    }

    /// Open seeded from `entity`
    pub fn open_edit(&mut self, id: &str, entity: &F::Entity) -> Result<()> {
        let mode = ModalMode::Edit(id.to_string());
        self.ensure_closed(ModalState::Open(mode.clone()))?;
        self.form = F::from_entity(entity);
        self.errors.clear();
        self.state = ModalState::Open(mode);
        debug!(resource = F::RESOURCE, id = id, "Modal opened for edit");
        Ok(())
    }

    /// Cancel; not possible while a request is in flight
    pub fn close(&mut self) -> Result<()> {
        if let ModalState::Submitting(_) = self.state {
            return Err(self.transition_error(ModalState::Closed));
        }
        self.state = ModalState::Closed;
        self.errors.clear();
        Ok(())
    }

    /// Validate and move to `Submitting`, handing out the request
    pub fn submit(&mut self) -> Result<Submission<F::Create, F::Update>> {
        let mode = match &self.state {
            ModalState::Open(mode) => mode.clone(),
            _ => return Err(self.transition_error(ModalState::Submitting(ModalMode::Create))),
        };

        let errors = self.form.validate(&mode);
        if !errors.is_empty() {
            debug!(resource = F::RESOURCE, fields = errors.len(), "Form validation failed");
            self.errors = errors.clone();
            return Err(ConsoleError::Validation(errors));
        }

        self.errors.clear();
        let submission = match &mode {
            ModalMode::Create => Submission::Create(self.form.create_request()),
            ModalMode::Edit(id) => Submission::Update {
                id: id.clone(),
                body: self.form.update_request(id),
            },
        };
        self.state = ModalState::Submitting(mode);
        Ok(submission)
    }

    /// Record the request outcome and build the notification for it
    pub fn finish<T>(&mut self, outcome: &Result<T>) -> Result<Notification> {
        let mode = match &self.state {
            ModalState::Submitting(mode) => mode.clone(),
            _ => return Err(self.transition_error(ModalState::Closed)),
        };

        Ok(match outcome {
            Ok(_) => {
                self.state = ModalState::Closed;
                let action = match mode {
                    ModalMode::Create => "created",
                    ModalMode::Edit(_) => "updated",
                };
                Notification::success("Muvaffaqiyatli", format!("{} {}", F::RESOURCE, action))
            }
            Err(e) => {
                self.state = ModalState::Open(mode);
                Notification::from_error("Xatolik", e)
            }
        })
    }

    /// Submit, run the mutation and notify about the outcome
    ///
    /// Validation failures return before `mutate` is called.
    pub async fn submit_with<T, Fut>(
        &mut self,
        notifier: &dyn Notifier,
        mutate: impl FnOnce(Submission<F::Create, F::Update>) -> Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let submission = self.submit()?;
        let outcome = mutate(submission).await;
        let notification = self.finish(&outcome)?;
        notifier.notify(notification).await;
        outcome
    }

    fn ensure_closed(&self, to: ModalState) -> Result<()> {
        match self.state {
            ModalState::Closed => Ok(()),
            _ => Err(self.transition_error(to)),
        }
    }

    fn transition_error(&self, to: ModalState) -> ConsoleError {
        ConsoleError::InvalidStateTransition {
            from: self.state.to_string(),
            to: to.to_string(),
        }
    }
}
