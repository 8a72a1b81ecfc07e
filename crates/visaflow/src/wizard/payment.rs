//! Read-only payment receipt view.

use std::sync::Arc;

use crate::api::VisaBackend;
use crate::domain::Payment;
use crate::store::{lock_shared, SharedDraftStore};

use super::{Lifecycle, StepPhase, WizardError};

pub struct PaymentController {
    backend: Arc<dyn VisaBackend>,
    store: SharedDraftStore,
    lifecycle: Lifecycle,
    phase: StepPhase,
    pub payment: Option<Payment>,
    pub server_error: Option<String>,
}

impl PaymentController {
    pub fn new(backend: Arc<dyn VisaBackend>, store: SharedDraftStore) -> Self {
        Self {
            backend,
            store,
            lifecycle: Lifecycle::default(),
            phase: StepPhase::Idle,
            payment: None,
            server_error: None,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn dismiss(&mut self) {
        self.lifecycle.invalidate();
    }

    pub async fn load(&mut self) -> Result<(), WizardError> {
        let id = lock_shared(&self.store)
            .application_id()
            .cloned()
            .ok_or(WizardError::MissingApplicationId)?;

        self.phase = StepPhase::Loading;
        let ticket = self.lifecycle.begin();
        let result = self.backend.get_payment_by_application_id(&id).await;
        if !self.lifecycle.is_current(ticket) {
            return Err(WizardError::Stale);
        }

        match result {
            Ok(payment) => {
                self.payment = Some(payment);
                self.phase = StepPhase::Populated;
                Ok(())
            }
            Err(error) => {
                self.server_error = Some(error.to_string());
                self.phase = StepPhase::Failure;
                Err(error.into())
            }
        }
    }
}
