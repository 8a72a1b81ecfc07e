//! Additional applicants roster step.
//!
//! The backend addresses roster entries by position, which shifts whenever an
//! earlier entry is deleted. Internally every entry gets a stable handle; the
//! position is resolved from the handle only at the moment a request is sent,
//! so a held handle can never hit the wrong applicant after a renumbering.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::api::VisaBackend;
use crate::domain::AdditionalApplicant;
use crate::navigation::Route;
use crate::store::{lock_shared, SharedDraftStore};
use crate::validation::{
    validate_additional_applicant, AdditionalApplicantForm, FieldErrors,
};

use super::{Lifecycle, StepOutcome, StepPhase, WizardError, ROSTER_RESET_DELAY};

const PAYMENT_STEP: u8 = 5;

/// A roster entry with its stable handle.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: Uuid,
    pub applicant: AdditionalApplicant,
}

/// Whether the form feeds a new entry or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterMode {
    Add,
    Edit(Uuid),
}

/// Deleting an applicant is not undoable; callers must pass explicit
/// confirmation collected from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
}

pub struct AdditionalApplicantsController {
    backend: Arc<dyn VisaBackend>,
    store: SharedDraftStore,
    lifecycle: Lifecycle,
    phase: StepPhase,
    roster: Vec<RosterEntry>,
    pub mode: RosterMode,
    pub form: AdditionalApplicantForm,
    pub errors: FieldErrors,
    pub server_error: Option<String>,
}

impl AdditionalApplicantsController {
    pub fn new(backend: Arc<dyn VisaBackend>, store: SharedDraftStore, today: NaiveDate) -> Self {
        Self {
            backend,
            store,
            lifecycle: Lifecycle::default(),
            phase: StepPhase::Idle,
            roster: Vec::new(),
            mode: RosterMode::Add,
            form: AdditionalApplicantForm::default_for(today),
            errors: FieldErrors::new(),
            server_error: None,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
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
        let result = self.backend.get_application(&id).await;
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

        self.sync_roster(application.additional_applicants.clone());
        self.phase = if self.roster.is_empty() {
            StepPhase::Empty
        } else {
            StepPhase::Populated
        };
        lock_shared(&self.store).remember_application(&application)?;
        Ok(())
    }

    /// Load a roster entry into the form for editing.
    pub fn begin_edit(&mut self, id: Uuid) -> Result<(), WizardError> {
        let entry = self
            .roster
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(WizardError::UnknownApplicant)?;
        self.form = AdditionalApplicantForm::from_applicant(&entry.applicant);
        self.mode = RosterMode::Edit(id);
        self.phase = StepPhase::Editing;
        Ok(())
    }

    /// Drop back to add mode with a fresh form.
    pub fn cancel_edit(&mut self, today: NaiveDate) {
        self.mode = RosterMode::Add;
        self.form = AdditionalApplicantForm::default_for(today);
        self.errors.clear();
    }

    pub async fn submit(&mut self, today: NaiveDate) -> Result<StepOutcome, WizardError> {
        self.server_error = None;
        let applicant = match validate_additional_applicant(&self.form, today) {
            Ok(applicant) => applicant,
            Err(errors) => {
                self.errors = errors.clone();
                self.phase = StepPhase::Editing;
                return Err(WizardError::Validation(errors));
            }
        };
        self.errors.clear();

        let id = lock_shared(&self.store)
            .application_id()
            .cloned()
            .ok_or(WizardError::MissingApplicationId)?;

        let mode = self.mode;
        self.phase = StepPhase::Submitting;
        let ticket = self.lifecycle.begin();
        let result = match mode {
            RosterMode::Add => self.backend.add_applicant(&id, &applicant).await,
            RosterMode::Edit(handle) => {
                let index = self.index_of(handle)?;
                self.backend.update_applicant(&id, index, &applicant).await
            }
        };
        if !self.lifecycle.is_current(ticket) {
            return Err(WizardError::Stale);
        }

        let roster = match result {
            Ok(roster) => roster,
            Err(error) => {
                self.server_error = Some(error.to_string());
                self.phase = StepPhase::Failure;
                return Err(error.into());
            }
        };

        self.sync_roster(roster.clone());
        lock_shared(&self.store).patch_additional_applicants(roster)?;
        self.mode = RosterMode::Add;
        self.form = AdditionalApplicantForm::default_for(today);
        self.phase = StepPhase::Success;
        info!(id = id.as_str(), roster = self.roster.len(), "roster saved");

        let message = match mode {
            RosterMode::Add => "Applicant added successfully",
            RosterMode::Edit(_) => "Applicant updated successfully",
        };
        Ok(StepOutcome {
            application_id: id,
            next: Route::AdditionalApplicants,
            advance_after: ROSTER_RESET_DELAY,
            message: message.to_string(),
        })
    }

    pub async fn delete(
        &mut self,
        handle: Uuid,
        _confirmation: DeleteConfirmation,
    ) -> Result<(), WizardError> {
        let id = lock_shared(&self.store)
            .application_id()
            .cloned()
            .ok_or(WizardError::MissingApplicationId)?;
        let index = self.index_of(handle)?;

        let ticket = self.lifecycle.begin();
        let result = self.backend.delete_applicant(&id, index).await;
        if !self.lifecycle.is_current(ticket) {
            return Err(WizardError::Stale);
        }

        let roster = match result {
            Ok(roster) => roster,
            Err(error) => {
                self.server_error = Some(error.to_string());
                return Err(error.into());
            }
        };

        // Editing the entry that was just removed makes no sense.
        if self.mode == RosterMode::Edit(handle) {
            self.mode = RosterMode::Add;
        }
        self.sync_roster(roster.clone());
        lock_shared(&self.store).patch_additional_applicants(roster)?;
        Ok(())
    }

    /// Finish the step and move on to payment.
    pub fn continue_to_payment(&mut self) -> Result<Route, WizardError> {
        lock_shared(&self.store).set_current_step(PAYMENT_STEP)?;
        Ok(Route::Payment)
    }

    fn index_of(&self, handle: Uuid) -> Result<usize, WizardError> {
        self.roster
            .iter()
            .position(|entry| entry.id == handle)
            .ok_or(WizardError::UnknownApplicant)
    }

    /// Align the local roster with the server's by position, keeping the
    /// handles of entries that survived and minting handles for new ones.
    fn sync_roster(&mut self, server: Vec<AdditionalApplicant>) {
        let mut next = Vec::with_capacity(server.len());
        for (position, applicant) in server.into_iter().enumerate() {
            let id = self
                .roster
                .get(position)
                .map(|entry| entry.id)
                .unwrap_or_else(Uuid::new_v4);
            next.push(RosterEntry { id, applicant });
        }
        self.roster = next;
    }
}
