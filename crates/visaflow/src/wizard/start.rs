//! Trip-selection step.

use std::sync::Arc;

use tracing::info;

use crate::api::VisaBackend;
use crate::navigation::Route;
use crate::store::{lock_shared, SharedDraftStore};
use crate::validation::{validate_start_application, FieldErrors, StartApplicationForm};

use super::{Lifecycle, StepOutcome, StepPhase, WizardError, SUCCESS_BANNER_DELAY};

/// Creates a new application, or updates the trip selection of the one the
/// draft store already points at.
pub struct StartController {
    backend: Arc<dyn VisaBackend>,
    store: SharedDraftStore,
    lifecycle: Lifecycle,
    phase: StepPhase,
    pub form: StartApplicationForm,
    pub errors: FieldErrors,
    pub server_error: Option<String>,
}

impl StartController {
    pub fn new(backend: Arc<dyn VisaBackend>, store: SharedDraftStore) -> Self {
        Self {
            backend,
            store,
            lifecycle: Lifecycle::default(),
            phase: StepPhase::Idle,
            form: StartApplicationForm::default(),
            errors: FieldErrors::new(),
            server_error: None,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Prefill the form from the draft store.
    pub fn load(&mut self) {
        let store = lock_shared(&self.store);
        if let Some(email) = store.draft().email.as_deref() {
            self.form.email = email.to_string();
        }
        self.phase = if store.application_id().is_some() {
            StepPhase::Populated
        } else {
            StepPhase::Empty
        };
    }

    /// Discard any in-flight response; called when the screen goes away.
    pub fn dismiss(&mut self) {
        self.lifecycle.invalidate();
    }

    pub async fn submit(&mut self) -> Result<StepOutcome, WizardError> {
        self.server_error = None;
        let request = match validate_start_application(&self.form) {
            Ok(request) => request,
            Err(errors) => {
                self.errors = errors.clone();
                self.phase = StepPhase::Editing;
                return Err(WizardError::Validation(errors));
            }
        };
        self.errors.clear();

        let existing_id = lock_shared(&self.store).application_id().cloned();
        self.phase = StepPhase::Submitting;
        let ticket = self.lifecycle.begin();

        let result = match &existing_id {
            Some(id) => self.backend.update_application(id, &request).await,
            None => self.backend.start_application(&request).await,
        };

        if !self.lifecycle.is_current(ticket) {
            return Err(WizardError::Stale);
        }

        let application = match result {
            Ok(application) => application,
            Err(error) => {
                self.server_error = Some(error.to_string());
                self.phase = StepPhase::Failure;
                return Err(error.into());
            }
        };

        lock_shared(&self.store).remember_application(&application)?;
        info!(id = application.application_id.as_str(), "application started");
        self.phase = StepPhase::Success;

        Ok(StepOutcome {
            application_id: application.application_id.clone(),
            next: Route::Status {
                id: application.application_id,
            },
            advance_after: SUCCESS_BANNER_DELAY,
            message: "Application started successfully".to_string(),
        })
    }
}
