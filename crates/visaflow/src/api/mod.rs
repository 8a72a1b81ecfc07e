//! Visa backend client: the port the wizard talks to and its HTTP adapter.

use async_trait::async_trait;

use crate::domain::{
    AdditionalApplicant, Application, ApplicationId, DocumentSet, MainApplicant, MediaFile,
    MediaUpload, Payment, StartApplicationRequest,
};

mod envelope;
mod http;

pub use envelope::{Envelope, EnvelopeError};
pub use http::HttpBackend;

/// Backend failures, collapsed into the three cases callers present to the
/// user: a transport problem, a structured backend rejection, or a response
/// the client could not interpret.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a usable response.
    #[error("Network error occurred")]
    Network { detail: String },
    /// The backend answered with `success: false`.
    #[error("{message}")]
    Api { message: String, code: Option<String> },
    /// The response could not be interpreted, typically a proxy error page.
    #[error("Server error occurred")]
    Server { detail: String },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { code: Some(code), .. } if code == "NOT_FOUND")
    }
}

/// Operations the wizard needs from the visa backend.
#[async_trait]
pub trait VisaBackend: Send + Sync {
    async fn get_application(&self, id: &ApplicationId) -> Result<Application, ApiError>;

    async fn start_application(
        &self,
        request: &StartApplicationRequest,
    ) -> Result<Application, ApiError>;

    async fn update_application(
        &self,
        id: &ApplicationId,
        request: &StartApplicationRequest,
    ) -> Result<Application, ApiError>;

    async fn save_applicant_details(
        &self,
        id: &ApplicationId,
        details: &MainApplicant,
    ) -> Result<MainApplicant, ApiError>;

    async fn update_applicant_details(
        &self,
        id: &ApplicationId,
        details: &MainApplicant,
    ) -> Result<MainApplicant, ApiError>;

    async fn upload_documents(
        &self,
        id: &ApplicationId,
        documents: &DocumentSet,
    ) -> Result<DocumentSet, ApiError>;

    async fn update_documents(
        &self,
        id: &ApplicationId,
        documents: &DocumentSet,
    ) -> Result<DocumentSet, ApiError>;

    async fn add_applicant(
        &self,
        id: &ApplicationId,
        applicant: &AdditionalApplicant,
    ) -> Result<Vec<AdditionalApplicant>, ApiError>;

    /// `index` is the applicant's position in the server-side roster.
    async fn update_applicant(
        &self,
        id: &ApplicationId,
        index: usize,
        applicant: &AdditionalApplicant,
    ) -> Result<Vec<AdditionalApplicant>, ApiError>;

    async fn delete_applicant(
        &self,
        id: &ApplicationId,
        index: usize,
    ) -> Result<Vec<AdditionalApplicant>, ApiError>;

    async fn get_payment_by_application_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Payment, ApiError>;

    async fn upload_files(
        &self,
        files: Vec<MediaFile>,
        folder: &str,
    ) -> Result<Vec<MediaUpload>, ApiError>;
}
