//! Application lookup by ID.
//!
//! A failed lookup is an expected outcome, not an error: the store is reset
//! and the caller is routed to the not-found screen with the attempted ID.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::VisaBackend;
use crate::domain::{Application, ApplicationId};
use crate::navigation::{next_action, NextAction};
use crate::store::{lock_shared, SharedDraftStore};
use crate::validation::FieldErrors;

use super::{Lifecycle, StepPhase, WizardError};

#[derive(Debug, Clone, PartialEq)]
pub enum StatusCheckOutcome {
    Found {
        application: Application,
        next: NextAction,
    },
    NotFound {
        attempted_id: String,
        message: String,
    },
}

pub struct StatusCheckController {
    backend: Arc<dyn VisaBackend>,
    store: SharedDraftStore,
    lifecycle: Lifecycle,
    phase: StepPhase,
}

impl StatusCheckController {
    pub fn new(backend: Arc<dyn VisaBackend>, store: SharedDraftStore) -> Self {
        Self {
            backend,
            store,
            lifecycle: Lifecycle::default(),
            phase: StepPhase::Idle,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn dismiss(&mut self) {
        self.lifecycle.invalidate();
    }

    pub async fn check(&mut self, raw_id: &str) -> Result<StatusCheckOutcome, WizardError> {
        let candidate = raw_id.trim().to_uppercase();
        let id = match ApplicationId::parse(&candidate) {
            Ok(id) => id,
            Err(_) => {
                let mut errors = FieldErrors::new();
                errors.insert(
                    "applicationId".to_string(),
                    "Invalid application ID format".to_string(),
                );
                return Err(WizardError::Validation(errors));
            }
        };

        self.phase = StepPhase::Loading;
        let ticket = self.lifecycle.begin();
        let result = self.backend.get_application(&id).await;
        if !self.lifecycle.is_current(ticket) {
            return Err(WizardError::Stale);
        }

        match result {
            Ok(application) => {
                lock_shared(&self.store).remember_application(&application)?;
                self.phase = StepPhase::Populated;
                info!(
                    id = application.application_id.as_str(),
                    status = application.status.label(),
                    "application found"
                );
                let next = next_action(application.status, Some(application.current_step));
                Ok(StatusCheckOutcome::Found { application, next })
            }
            Err(error) => {
                warn!(id = id.as_str(), error = %error, "application lookup failed");
                lock_shared(&self.store).reset()?;
                self.phase = StepPhase::Empty;
                Ok(StatusCheckOutcome::NotFound {
                    attempted_id: candidate,
                    message: error.to_string(),
                })
            }
        }
    }
}
