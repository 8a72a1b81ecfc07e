//! Server-simulating backend for whole-flow tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;
use visaflow::api::{ApiError, VisaBackend};
use visaflow::domain::{
    AdditionalApplicant, Application, ApplicationId, ApplicationStatus, DocumentSet, MainApplicant,
    MediaFile, MediaUpload, Payment, StartApplicationRequest,
};

#[derive(Default)]
struct ServerState {
    application: Option<Application>,
    payment: Option<Payment>,
}

/// Keeps one application's state the way the real backend would, so a flow of
/// controller calls observes its own earlier writes.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<ServerState>,
}

impl MemoryBackend {
    pub fn with_payment_ready() -> Self {
        let backend = Self::default();
        backend.state.lock().expect("lock").payment = Some(Payment {
            payment_id: "PAY-1".to_string(),
            transaction_id: "TXN-9".to_string(),
            status: "completed".to_string(),
            amount: 65.0,
            currency: "USD".to_string(),
            payer_email: "applicant@example.com".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).single().expect("timestamp"),
            updated_at: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 5).single().expect("timestamp"),
        });
        backend
    }

    fn not_found() -> ApiError {
        ApiError::Api {
            message: "Application not found".to_string(),
            code: Some("NOT_FOUND".to_string()),
        }
    }

    fn fresh_id() -> ApplicationId {
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .to_uppercase()
            .chars()
            .take(8)
            .collect();
        ApplicationId::parse(&format!("TUR-{suffix}")).expect("generated id is well formed")
    }
}

#[async_trait]
impl VisaBackend for MemoryBackend {
    async fn get_application(&self, id: &ApplicationId) -> Result<Application, ApiError> {
        let state = self.state.lock().expect("lock");
        match &state.application {
            Some(application) if &application.application_id == id => Ok(application.clone()),
            _ => Err(Self::not_found()),
        }
    }

    async fn start_application(
        &self,
        request: &StartApplicationRequest,
    ) -> Result<Application, ApiError> {
        let application = Application {
            application_id: Self::fresh_id(),
            passport_country: request.passport_country.clone(),
            travel_document: request.travel_document.clone(),
            visa_type: request.visa_type.clone(),
            destination: request.destination.clone(),
            email: request.email.clone(),
            status: ApplicationStatus::Started,
            current_step: 2,
            visa_fee: 5000,
            service_fee: 1500,
            main_applicant: None,
            documents: None,
            additional_applicants: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        self.state.lock().expect("lock").application = Some(application.clone());
        Ok(application)
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        request: &StartApplicationRequest,
    ) -> Result<Application, ApiError> {
        let mut state = self.state.lock().expect("lock");
        let application = match state.application.as_mut() {
            Some(application) if &application.application_id == id => application,
            _ => return Err(Self::not_found()),
        };
        application.passport_country = request.passport_country.clone();
        application.travel_document = request.travel_document.clone();
        application.visa_type = request.visa_type.clone();
        application.destination = request.destination.clone();
        application.email = request.email.clone();
        Ok(application.clone())
    }

    async fn save_applicant_details(
        &self,
        id: &ApplicationId,
        details: &MainApplicant,
    ) -> Result<MainApplicant, ApiError> {
        self.update_applicant_details(id, details).await
    }

    async fn update_applicant_details(
        &self,
        id: &ApplicationId,
        details: &MainApplicant,
    ) -> Result<MainApplicant, ApiError> {
        let mut state = self.state.lock().expect("lock");
        let application = match state.application.as_mut() {
            Some(application) if &application.application_id == id => application,
            _ => return Err(Self::not_found()),
        };
        application.main_applicant = Some(details.clone());
        application.status = ApplicationStatus::InProgress;
        application.current_step = application.current_step.max(3);
        Ok(details.clone())
    }

    async fn upload_documents(
        &self,
        id: &ApplicationId,
        documents: &DocumentSet,
    ) -> Result<DocumentSet, ApiError> {
        self.update_documents(id, documents).await
    }

    async fn update_documents(
        &self,
        id: &ApplicationId,
        documents: &DocumentSet,
    ) -> Result<DocumentSet, ApiError> {
        let mut state = self.state.lock().expect("lock");
        let application = match state.application.as_mut() {
            Some(application) if &application.application_id == id => application,
            _ => return Err(Self::not_found()),
        };
        application.documents = Some(documents.clone());
        application.current_step = application.current_step.max(4);
        Ok(documents.clone())
    }

    async fn add_applicant(
        &self,
        id: &ApplicationId,
        applicant: &AdditionalApplicant,
    ) -> Result<Vec<AdditionalApplicant>, ApiError> {
        let mut state = self.state.lock().expect("lock");
        let application = match state.application.as_mut() {
            Some(application) if &application.application_id == id => application,
            _ => return Err(Self::not_found()),
        };
        application.additional_applicants.push(applicant.clone());
        Ok(application.additional_applicants.clone())
    }

    async fn update_applicant(
        &self,
        id: &ApplicationId,
        index: usize,
        applicant: &AdditionalApplicant,
    ) -> Result<Vec<AdditionalApplicant>, ApiError> {
        let mut state = self.state.lock().expect("lock");
        let application = match state.application.as_mut() {
            Some(application) if &application.application_id == id => application,
            _ => return Err(Self::not_found()),
        };
        match application.additional_applicants.get_mut(index) {
            Some(slot) => *slot = applicant.clone(),
            None => return Err(Self::not_found()),
        }
        Ok(application.additional_applicants.clone())
    }

    async fn delete_applicant(
        &self,
        id: &ApplicationId,
        index: usize,
    ) -> Result<Vec<AdditionalApplicant>, ApiError> {
        let mut state = self.state.lock().expect("lock");
        let application = match state.application.as_mut() {
            Some(application) if &application.application_id == id => application,
            _ => return Err(Self::not_found()),
        };
        if index >= application.additional_applicants.len() {
            return Err(Self::not_found());
        }
        application.additional_applicants.remove(index);
        Ok(application.additional_applicants.clone())
    }

    async fn get_payment_by_application_id(
        &self,
        _id: &ApplicationId,
    ) -> Result<Payment, ApiError> {
        self.state
            .lock()
            .expect("lock")
            .payment
            .clone()
            .ok_or_else(|| ApiError::Api {
                message: "Payment not found".to_string(),
                code: Some("NOT_FOUND".to_string()),
            })
    }

    async fn upload_files(
        &self,
        files: Vec<MediaFile>,
        folder: &str,
    ) -> Result<Vec<MediaUpload>, ApiError> {
        Ok(files
            .into_iter()
            .map(|file| MediaUpload {
                url: format!("https://media.example.com/{folder}/{}", file.file_name),
                public_id: Some(format!("{folder}/{}", file.file_name)),
                format: None,
                width: None,
                height: None,
                uploaded_at: None,
            })
            .collect())
    }
}
