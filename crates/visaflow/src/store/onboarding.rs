//! Onboarding selection persisted independently of any application.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{load_blob, save_blob, DraftStorage, StoreError, ONBOARDING_STORE_KEY};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingState {
    pub selected_country: Option<String>,
    pub is_onboarding_complete: bool,
}

pub struct OnboardingStore {
    storage: Arc<dyn DraftStorage>,
    state: OnboardingState,
}

impl OnboardingStore {
    pub fn open(storage: Arc<dyn DraftStorage>) -> Result<Self, StoreError> {
        let state = load_blob(storage.as_ref(), ONBOARDING_STORE_KEY)?;
        Ok(Self { storage, state })
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn select_country(&mut self, country: String) -> Result<(), StoreError> {
        self.state.selected_country = Some(country);
        self.persist()
    }

    pub fn complete_onboarding(&mut self) -> Result<(), StoreError> {
        self.state.is_onboarding_complete = true;
        self.persist()
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.state = OnboardingState::default();
        self.storage.remove(ONBOARDING_STORE_KEY)
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_blob(self.storage.as_ref(), ONBOARDING_STORE_KEY, &self.state)
    }
}
