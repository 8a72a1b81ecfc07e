//! Step controllers for the application wizard.
//!
//! Each screen owns one controller holding its form state, phase, and field
//! errors. Controllers are constructor-injected with the backend port and the
//! shared draft store; nothing here reaches for globals.

use std::time::Duration;

use crate::api::ApiError;
use crate::domain::ApplicationId;
use crate::navigation::Route;
use crate::store::StoreError;
use crate::validation::FieldErrors;

mod applicant;
mod applicants;
mod documents;
mod payment;
mod start;
mod status_check;

pub use applicant::ApplicantDetailsController;
pub use applicants::{
    AdditionalApplicantsController, DeleteConfirmation, RosterEntry, RosterMode,
};
pub use documents::DocumentsController;
pub use payment::PaymentController;
pub use start::StartController;
pub use status_check::{StatusCheckController, StatusCheckOutcome};

/// How long the success banner stays up before the wizard advances.
pub const SUCCESS_BANNER_DELAY: Duration = Duration::from_secs(1);

/// How long the roster screen shows its banner before the form resets.
pub const ROSTER_RESET_DELAY: Duration = Duration::from_secs(2);

/// Where a step screen currently is in its load/edit/submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPhase {
    #[default]
    Idle,
    Loading,
    /// Loaded with no prior data for this step.
    Empty,
    /// Loaded with server data filled into the form.
    Populated,
    Editing,
    Submitting,
    Success,
    Failure,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("please correct the highlighted fields")]
    Validation(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no application in progress")]
    MissingApplicationId,
    #[error("applicant is no longer in the roster")]
    UnknownApplicant,
    #[error("superseded by a newer operation")]
    Stale,
}

/// Successful submit: where to go next and what to show in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub application_id: ApplicationId,
    pub next: Route,
    pub advance_after: Duration,
    pub message: String,
}

/// Guards against settled responses landing after the screen moved on.
///
/// Every load or submit takes a ticket; bumping the generation (a newer
/// operation, or the screen going away) makes older tickets stale, and a
/// stale ticket means the response must be discarded untouched.
#[derive(Debug, Default)]
pub struct Lifecycle {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Lifecycle {
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation == ticket.0
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub backend shared by the controller tests.

    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::api::{ApiError, VisaBackend};
    use crate::domain::{
        AdditionalApplicant, Application, ApplicationId, ApplicationStatus, DocumentSet,
        MainApplicant, MediaFile, MediaUpload, Payment, StartApplicationRequest,
    };

    pub fn application_id() -> ApplicationId {
        ApplicationId::parse("TUR-A1B2C3D4").expect("well-formed id")
    }

    pub fn sample_application() -> Application {
        Application {
            application_id: application_id(),
            passport_country: "Vietnam".to_string(),
            travel_document: "Ordinary Passport".to_string(),
            visa_type: "Electronic Visa".to_string(),
            destination: "Turkey".to_string(),
            email: "applicant@example.com".to_string(),
            status: ApplicationStatus::Started,
            current_step: 2,
            visa_fee: 5000,
            service_fee: 1500,
            main_applicant: None,
            documents: None,
            additional_applicants: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn sample_main_applicant() -> MainApplicant {
        MainApplicant {
            arrival_date: NaiveDate::from_ymd_opt(2026, 7, 1).expect("date"),
            given_names: "ANNA".to_string(),
            surname: "KOVACS".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 12).expect("date"),
            place_of_birth: "Budapest".to_string(),
            mother_name: "EVA KOVACS".to_string(),
            father_name: "PETER KOVACS".to_string(),
            passport_number: "HU1234567".to_string(),
            passport_issue_date: NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
            passport_expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).expect("date"),
        }
    }

    /// Scripted backend: calls are recorded, the next failure can be queued,
    /// and responses come from the mutable fixtures below.
    #[derive(Default)]
    pub struct StubBackend {
        pub application: Mutex<Option<Application>>,
        pub roster: Mutex<Vec<AdditionalApplicant>>,
        pub payment: Mutex<Option<Payment>>,
        pub uploads: Mutex<Vec<MediaUpload>>,
        pub next_error: Mutex<Option<ApiError>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubBackend {
        pub fn with_application(application: Application) -> Self {
            let stub = Self::default();
            *stub.application.lock().expect("lock") = Some(application);
            stub
        }

        pub fn fail_next(&self, error: ApiError) {
            *self.next_error.lock().expect("lock") = Some(error);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }

        fn record(&self, call: &str) -> Result<(), ApiError> {
            self.calls.lock().expect("lock").push(call.to_string());
            match self.next_error.lock().expect("lock").take() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        fn current_application(&self) -> Result<Application, ApiError> {
            self.application
                .lock()
                .expect("lock")
                .clone()
                .ok_or_else(|| ApiError::Api {
                    message: "Application not found".to_string(),
                    code: Some("NOT_FOUND".to_string()),
                })
        }
    }

    #[async_trait]
    impl VisaBackend for StubBackend {
        async fn get_application(&self, _id: &ApplicationId) -> Result<Application, ApiError> {
            self.record("get_application")?;
            self.current_application()
        }

        async fn start_application(
            &self,
            request: &StartApplicationRequest,
        ) -> Result<Application, ApiError> {
            self.record("start_application")?;
            let mut application = sample_application();
            application.email = request.email.clone();
            application.passport_country = request.passport_country.clone();
            *self.application.lock().expect("lock") = Some(application.clone());
            Ok(application)
        }

        async fn update_application(
            &self,
            _id: &ApplicationId,
            request: &StartApplicationRequest,
        ) -> Result<Application, ApiError> {
            self.record("update_application")?;
            let mut application = self.current_application()?;
            application.email = request.email.clone();
            application.passport_country = request.passport_country.clone();
            *self.application.lock().expect("lock") = Some(application.clone());
            Ok(application)
        }

        async fn save_applicant_details(
            &self,
            _id: &ApplicationId,
            details: &MainApplicant,
        ) -> Result<MainApplicant, ApiError> {
            self.record("save_applicant_details")?;
            Ok(details.clone())
        }

        async fn update_applicant_details(
            &self,
            _id: &ApplicationId,
            details: &MainApplicant,
        ) -> Result<MainApplicant, ApiError> {
            self.record("update_applicant_details")?;
            Ok(details.clone())
        }

        async fn upload_documents(
            &self,
            _id: &ApplicationId,
            documents: &DocumentSet,
        ) -> Result<DocumentSet, ApiError> {
            self.record("upload_documents")?;
            Ok(documents.clone())
        }

        async fn update_documents(
            &self,
            _id: &ApplicationId,
            documents: &DocumentSet,
        ) -> Result<DocumentSet, ApiError> {
            self.record("update_documents")?;
            Ok(documents.clone())
        }

        async fn add_applicant(
            &self,
            _id: &ApplicationId,
            applicant: &AdditionalApplicant,
        ) -> Result<Vec<AdditionalApplicant>, ApiError> {
            self.record("add_applicant")?;
            let mut roster = self.roster.lock().expect("lock");
            roster.push(applicant.clone());
            Ok(roster.clone())
        }

        async fn update_applicant(
            &self,
            _id: &ApplicationId,
            index: usize,
            applicant: &AdditionalApplicant,
        ) -> Result<Vec<AdditionalApplicant>, ApiError> {
            self.record("update_applicant")?;
            let mut roster = self.roster.lock().expect("lock");
            match roster.get_mut(index) {
                Some(slot) => *slot = applicant.clone(),
                None => {
                    return Err(ApiError::Api {
                        message: "Applicant not found".to_string(),
                        code: Some("NOT_FOUND".to_string()),
                    })
                }
            }
            Ok(roster.clone())
        }

        async fn delete_applicant(
            &self,
            _id: &ApplicationId,
            index: usize,
        ) -> Result<Vec<AdditionalApplicant>, ApiError> {
            self.record("delete_applicant")?;
            let mut roster = self.roster.lock().expect("lock");
            if index >= roster.len() {
                return Err(ApiError::Api {
                    message: "Applicant not found".to_string(),
                    code: Some("NOT_FOUND".to_string()),
                });
            }
            roster.remove(index);
            Ok(roster.clone())
        }

        async fn get_payment_by_application_id(
            &self,
            _id: &ApplicationId,
        ) -> Result<Payment, ApiError> {
            self.record("get_payment_by_application_id")?;
            self.payment
                .lock()
                .expect("lock")
                .clone()
                .ok_or_else(|| ApiError::Api {
                    message: "Payment not found".to_string(),
                    code: Some("NOT_FOUND".to_string()),
                })
        }

        async fn upload_files(
            &self,
            files: Vec<MediaFile>,
            _folder: &str,
        ) -> Result<Vec<MediaUpload>, ApiError> {
            self.record("upload_files")?;
            let scripted = self.uploads.lock().expect("lock").clone();
            if !scripted.is_empty() {
                return Ok(scripted);
            }
            Ok(files
                .into_iter()
                .map(|file| MediaUpload {
                    url: format!("https://media.example.com/{}", file.file_name),
                    public_id: None,
                    format: None,
                    width: None,
                    height: None,
                    uploaded_at: None,
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_go_stale_when_a_newer_operation_begins() {
        let mut lifecycle = Lifecycle::default();
        let first = lifecycle.begin();
        assert!(lifecycle.is_current(first));

        let second = lifecycle.begin();
        assert!(!lifecycle.is_current(first));
        assert!(lifecycle.is_current(second));
    }

    #[test]
    fn invalidate_expires_every_outstanding_ticket() {
        let mut lifecycle = Lifecycle::default();
        let ticket = lifecycle.begin();
        lifecycle.invalidate();
        assert!(!lifecycle.is_current(ticket));
    }

    #[test]
    fn validation_errors_keep_their_field_map() {
        let mut fields = FieldErrors::new();
        fields.insert("email".to_string(), "Please enter a valid email address".to_string());
        let error = WizardError::Validation(fields);
        match error {
            WizardError::Validation(errors) => assert!(errors.contains_key("email")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
