//! Main applicant details step.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::api::VisaBackend;
use crate::navigation::Route;
use crate::store::{lock_shared, SharedDraftStore};
use crate::validation::{
    parse_iso_date, passport_expiry_floor, validate_main_applicant, ApplicantDetailsForm,
    FieldErrors,
};

use super::{Lifecycle, StepOutcome, StepPhase, WizardError, SUCCESS_BANNER_DELAY};

const DOCUMENTS_STEP: u8 = 3;

/// Loads, edits, and submits the primary applicant's details.
pub struct ApplicantDetailsController {
    backend: Arc<dyn VisaBackend>,
    store: SharedDraftStore,
    lifecycle: Lifecycle,
    phase: StepPhase,
    has_existing: bool,
    pub form: ApplicantDetailsForm,
    pub errors: FieldErrors,
    pub server_error: Option<String>,
    /// Earliest selectable passport expiry, arrival plus the visa window.
    pub expiry_floor: Option<NaiveDate>,
    /// The expiry field stays disabled until an arrival date is chosen.
    pub expiry_enabled: bool,
}

impl ApplicantDetailsController {
    pub fn new(backend: Arc<dyn VisaBackend>, store: SharedDraftStore) -> Self {
        Self {
            backend,
            store,
            lifecycle: Lifecycle::default(),
            phase: StepPhase::Idle,
            has_existing: false,
            form: ApplicantDetailsForm::default(),
            errors: FieldErrors::new(),
            server_error: None,
            expiry_floor: None,
            expiry_enabled: false,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn dismiss(&mut self) {
        self.lifecycle.invalidate();
    }

    /// Fetch the application and fill the form: existing details when the
    /// server has them, dated defaults otherwise.
    pub async fn load(&mut self, today: NaiveDate) -> Result<(), WizardError> {
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

        match &application.main_applicant {
            Some(applicant) => {
                self.form = ApplicantDetailsForm::from_applicant(applicant);
                self.has_existing = true;
                self.phase = StepPhase::Populated;
            }
            None => {
                self.form = ApplicantDetailsForm::default_for(today);
                self.has_existing = false;
                self.phase = StepPhase::Empty;
            }
        }
        self.refresh_expiry_bounds();

        let mut store = lock_shared(&self.store);
        store.remember_application(&application)?;
        store.set_passport_expiry_enabled(self.expiry_enabled)?;
        Ok(())
    }

    /// Recompute the expiry floor for a new arrival date, pulling a too-early
    /// or missing expiry value up to the floor.
    pub fn arrival_date_changed(&mut self, value: &str) -> Result<(), WizardError> {
        self.form.arrival_date = value.to_string();
        self.refresh_expiry_bounds();
        if let Some(floor) = self.expiry_floor {
            let current = parse_iso_date(self.form.passport_expiry_date.trim());
            if current.map_or(true, |expiry| expiry < floor) {
                self.form.passport_expiry_date = floor.format("%Y-%m-%d").to_string();
            }
        }
        lock_shared(&self.store).set_passport_expiry_enabled(self.expiry_enabled)?;
        Ok(())
    }

    fn refresh_expiry_bounds(&mut self) {
        match parse_iso_date(self.form.arrival_date.trim()) {
            Some(arrival) => {
                self.expiry_floor = Some(passport_expiry_floor(arrival));
                self.expiry_enabled = true;
            }
            None => {
                self.expiry_floor = None;
                self.expiry_enabled = false;
            }
        }
    }

    pub async fn submit(&mut self, today: NaiveDate) -> Result<StepOutcome, WizardError> {
        self.server_error = None;
        let details = match validate_main_applicant(&self.form, today) {
            Ok(details) => details,
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

        self.phase = StepPhase::Submitting;
        let ticket = self.lifecycle.begin();
        let result = if self.has_existing {
            self.backend.update_applicant_details(&id, &details).await
        } else {
            self.backend.save_applicant_details(&id, &details).await
        };
        if !self.lifecycle.is_current(ticket) {
            return Err(WizardError::Stale);
        }

        let saved = match result {
            Ok(saved) => saved,
            Err(error) => {
                self.server_error = Some(error.to_string());
                self.phase = StepPhase::Failure;
                return Err(error.into());
            }
        };

        {
            let mut store = lock_shared(&self.store);
            store.patch_main_applicant(saved)?;
            store.set_current_step(DOCUMENTS_STEP)?;
        }
        self.has_existing = true;
        self.phase = StepPhase::Success;
        info!(id = id.as_str(), "applicant details saved");

        Ok(StepOutcome {
            application_id: id,
            next: Route::Documents,
            advance_after: SUCCESS_BANNER_DELAY,
            message: "Applicant details saved successfully".to_string(),
        })
    }
}
