//! The persisted application draft.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    AdditionalApplicant, Application, ApplicationId, ApplicationStatus, DocumentSet, MainApplicant,
};

use super::{load_blob, save_blob, DraftStorage, StoreError, APPLICATION_STORE_KEY};

/// Draft store shared by all step controllers.
pub type SharedDraftStore = Arc<Mutex<DraftStore>>;

/// Persisted snapshot of the wizard between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub application_id: Option<ApplicationId>,
    pub email: Option<String>,
    pub current_step: Option<u8>,
    pub status: Option<ApplicationStatus>,
    pub application_data: DraftData,
}

/// Locally entered data cached alongside the identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftData {
    pub main_applicant: Option<MainApplicant>,
    pub documents: Option<DocumentSet>,
    pub additional_applicants: Vec<AdditionalApplicant>,
    pub passport_expiry_enabled: bool,
}

/// Wraps a [`Draft`] with write-through persistence: every mutation saves
/// the full blob before returning.
pub struct DraftStore {
    storage: Arc<dyn DraftStorage>,
    draft: Draft,
}

impl DraftStore {
    /// Open the store, hydrating from persisted state when present.
    pub fn open(storage: Arc<dyn DraftStorage>) -> Result<Self, StoreError> {
        let draft = load_blob(storage.as_ref(), APPLICATION_STORE_KEY)?;
        Ok(Self { storage, draft })
    }

    pub fn shared(storage: Arc<dyn DraftStorage>) -> Result<SharedDraftStore, StoreError> {
        Ok(Arc::new(Mutex::new(Self::open(storage)?)))
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn application_id(&self) -> Option<&ApplicationId> {
        self.draft.application_id.as_ref()
    }

    /// Record a (possibly new) application ID. Switching to a different
    /// application discards cached data entered for the previous one.
    pub fn set_application_id(&mut self, id: ApplicationId) -> Result<(), StoreError> {
        if self.draft.application_id.as_ref() != Some(&id) {
            self.draft.application_data = DraftData::default();
        }
        self.draft.application_id = Some(id);
        self.persist()
    }

    pub fn set_email(&mut self, email: String) -> Result<(), StoreError> {
        self.draft.email = Some(email);
        self.persist()
    }

    pub fn set_current_step(&mut self, step: u8) -> Result<(), StoreError> {
        self.draft.current_step = Some(step);
        self.persist()
    }

    pub fn set_status(&mut self, status: ApplicationStatus) -> Result<(), StoreError> {
        self.draft.status = Some(status);
        self.persist()
    }

    /// Sync identifiers and cached slices from a server-side application.
    pub fn remember_application(&mut self, application: &Application) -> Result<(), StoreError> {
        if self.draft.application_id.as_ref() != Some(&application.application_id) {
            self.draft.application_data = DraftData::default();
        }
        self.draft.application_id = Some(application.application_id.clone());
        self.draft.email = Some(application.email.clone());
        self.draft.current_step = Some(application.current_step);
        self.draft.status = Some(application.status);
        self.draft.application_data.main_applicant = application.main_applicant.clone();
        self.draft.application_data.documents = application.documents.clone();
        self.draft.application_data.additional_applicants =
            application.additional_applicants.clone();
        self.persist()
    }

    pub fn patch_main_applicant(&mut self, applicant: MainApplicant) -> Result<(), StoreError> {
        self.draft.application_data.main_applicant = Some(applicant);
        self.persist()
    }

    pub fn patch_documents(&mut self, documents: DocumentSet) -> Result<(), StoreError> {
        self.draft.application_data.documents = Some(documents);
        self.persist()
    }

    pub fn patch_additional_applicants(
        &mut self,
        applicants: Vec<AdditionalApplicant>,
    ) -> Result<(), StoreError> {
        self.draft.application_data.additional_applicants = applicants;
        self.persist()
    }

    pub fn set_passport_expiry_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.draft.application_data.passport_expiry_enabled = enabled;
        self.persist()
    }

    /// Clear every field and remove the persisted blob.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        debug!(store = APPLICATION_STORE_KEY, "resetting draft store");
        self.draft = Draft::default();
        self.storage.remove(APPLICATION_STORE_KEY)
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_blob(self.storage.as_ref(), APPLICATION_STORE_KEY, &self.draft)
    }
}
