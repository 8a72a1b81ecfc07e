//! Document upload step for the main application.

use std::sync::Arc;

use tracing::info;

use crate::api::VisaBackend;
use crate::domain::{MediaFile, UploadedDocument};
use crate::navigation::Route;
use crate::store::{lock_shared, SharedDraftStore};
use crate::validation::{
    validate_document_upload, DocumentUploadForm, FieldErrors, SupportingDocumentForm,
};

use super::{Lifecycle, StepOutcome, StepPhase, WizardError, SUCCESS_BANNER_DELAY};

const ADDITIONAL_APPLICANTS_STEP: u8 = 4;

/// Folder the media host files application documents under.
const DOCUMENT_FOLDER: &str = "documents";

pub struct DocumentsController {
    backend: Arc<dyn VisaBackend>,
    store: SharedDraftStore,
    lifecycle: Lifecycle,
    phase: StepPhase,
    has_existing: bool,
    pub form: DocumentUploadForm,
    pub errors: FieldErrors,
    pub server_error: Option<String>,
}

impl DocumentsController {
    pub fn new(backend: Arc<dyn VisaBackend>, store: SharedDraftStore) -> Self {
        Self {
            backend,
            store,
            lifecycle: Lifecycle::default(),
            phase: StepPhase::Idle,
            has_existing: false,
            form: DocumentUploadForm::default(),
            errors: FieldErrors::new(),
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

        match application.documents.as_ref().filter(|set| !set.is_empty()) {
            Some(documents) => {
                self.form = DocumentUploadForm::from_documents(documents);
                self.has_existing = true;
                self.phase = StepPhase::Populated;
            }
            None => {
                self.form = DocumentUploadForm {
                    supporting_documents: vec![SupportingDocumentForm::default()],
                    additional_documents: Vec::new(),
                };
                self.has_existing = false;
                self.phase = StepPhase::Empty;
            }
        }

        lock_shared(&self.store).remember_application(&application)?;
        Ok(())
    }

    /// Send selected files to the media host and append the results to the
    /// additional-documents list.
    pub async fn attach_uploads(&mut self, files: Vec<MediaFile>) -> Result<(), WizardError> {
        if files.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = files.iter().map(|file| file.file_name.clone()).collect();

        let ticket = self.lifecycle.begin();
        let result = self.backend.upload_files(files, DOCUMENT_FOLDER).await;
        if !self.lifecycle.is_current(ticket) {
            return Err(WizardError::Stale);
        }

        let uploads = match result {
            Ok(uploads) => uploads,
            Err(error) => {
                self.server_error = Some(error.to_string());
                return Err(error.into());
            }
        };

        for (name, upload) in names.into_iter().zip(uploads) {
            self.form.additional_documents.push(UploadedDocument {
                name,
                url: upload.url,
                public_id: upload.public_id,
                uploaded_at: upload.uploaded_at,
                size: None,
                format: upload.format,
                width: upload.width,
                height: upload.height,
            });
        }
        Ok(())
    }

    pub async fn submit(&mut self) -> Result<StepOutcome, WizardError> {
        self.server_error = None;
        let documents = match validate_document_upload(&self.form) {
            Ok(documents) => documents,
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
            self.backend.update_documents(&id, &documents).await
        } else {
            self.backend.upload_documents(&id, &documents).await
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
            store.patch_documents(saved)?;
            store.set_current_step(ADDITIONAL_APPLICANTS_STEP)?;
        }
        self.has_existing = true;
        self.phase = StepPhase::Success;
        info!(id = id.as_str(), "documents saved");

        Ok(StepOutcome {
            application_id: id,
            next: Route::AdditionalApplicants,
            advance_after: SUCCESS_BANNER_DELAY,
            message: "Documents saved successfully".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{application_id, sample_application, StubBackend};
    use super::*;
    use crate::domain::{DocumentSet, SupportingDocument, SupportingDocumentType};
    use crate::store::{DraftStore, MemoryStorage};
    use chrono::NaiveDate;

    fn controller_with(backend: Arc<StubBackend>) -> DocumentsController {
        let store = DraftStore::shared(Arc::new(MemoryStorage::default())).expect("store");
        lock_shared(&store)
            .set_application_id(application_id())
            .expect("seed id");
        DocumentsController::new(backend, store)
    }

    fn saved_documents() -> DocumentSet {
        DocumentSet {
            supporting_documents: vec![SupportingDocument {
                document_type: SupportingDocumentType::Visa,
                issuing_country: "Germany".to_string(),
                document_number: "D123456".to_string(),
                expiry_date: NaiveDate::from_ymd_opt(2027, 1, 1),
                is_unlimited: false,
            }],
            additional_documents: Vec::new(),
        }
    }

    #[tokio::test]
    async fn load_without_documents_seeds_one_blank_row() {
        let backend = Arc::new(StubBackend::with_application(sample_application()));
        let mut controller = controller_with(backend);

        controller.load().await.expect("load");
        assert_eq!(controller.phase(), StepPhase::Empty);
        assert_eq!(controller.form.supporting_documents.len(), 1);
        assert_eq!(controller.form.supporting_documents[0].document_type, "visa");
    }

    #[tokio::test]
    async fn load_with_documents_populates_and_switches_to_update() {
        let mut application = sample_application();
        application.documents = Some(saved_documents());
        let backend = Arc::new(StubBackend::with_application(application));
        let mut controller = controller_with(backend.clone());

        controller.load().await.expect("load");
        assert_eq!(controller.phase(), StepPhase::Populated);

        controller.submit().await.expect("submit");
        assert_eq!(
            backend.calls(),
            vec!["get_application", "update_documents"]
        );
    }

    #[tokio::test]
    async fn submit_validates_before_calling_the_backend() {
        let backend = Arc::new(StubBackend::with_application(sample_application()));
        let mut controller = controller_with(backend.clone());
        controller.load().await.expect("load");
        // the seeded blank row is incomplete
        let error = controller.submit().await.expect_err("blank row");
        assert!(matches!(error, WizardError::Validation(_)));
        assert_eq!(backend.calls(), vec!["get_application"]);
    }

    #[tokio::test]
    async fn submit_patches_the_store_and_advances() {
        let backend = Arc::new(StubBackend::with_application(sample_application()));
        let mut controller = controller_with(backend);
        controller.load().await.expect("load");
        controller.form = DocumentUploadForm::from_documents(&saved_documents());

        let outcome = controller.submit().await.expect("submit");
        assert_eq!(outcome.next, Route::AdditionalApplicants);

        let store = controller.store.lock().expect("store lock");
        assert_eq!(
            store.draft().application_data.documents,
            Some(saved_documents())
        );
        assert_eq!(store.draft().current_step, Some(ADDITIONAL_APPLICANTS_STEP));
    }

    #[tokio::test]
    async fn attach_uploads_appends_named_entries() {
        let backend = Arc::new(StubBackend::with_application(sample_application()));
        let mut controller = controller_with(backend);
        controller.load().await.expect("load");

        controller
            .attach_uploads(vec![MediaFile {
                file_name: "bank-statement.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: vec![1, 2, 3],
            }])
            .await
            .expect("upload");

        assert_eq!(controller.form.additional_documents.len(), 1);
        let entry = &controller.form.additional_documents[0];
        assert_eq!(entry.name, "bank-statement.pdf");
        assert_eq!(entry.url, "https://media.example.com/bank-statement.pdf");
    }
}
