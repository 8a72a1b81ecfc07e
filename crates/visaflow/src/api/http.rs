//! Reqwest adapter for [`VisaBackend`].
//!
//! Owns transport details only: request serialisation, timeout handling,
//! envelope decoding, and the mapping from wire failures to [`ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ApiConfig;
use crate::domain::{
    AdditionalApplicant, Application, ApplicationId, DocumentSet, MainApplicant, MediaFile,
    MediaUpload, Payment, StartApplicationRequest,
};

use super::{ApiError, Envelope, VisaBackend};

/// HTTP client for the visa backend and its media host.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    media_base_url: String,
}

impl HttpBackend {
    /// Build a backend client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ApiError::Network {
                detail: err.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            media_base_url: config.media_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn turkey_url(&self, path: &str) -> String {
        format!("{}/turkey/{path}", self.base_url)
    }

    fn payment_url(&self, id: &ApplicationId) -> String {
        format!("{}/payment/application/{}", self.base_url, id.as_str())
    }

    /// GETs retry once after a transport failure; mutating requests never do.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        match self.execute(self.client.get(url)).await {
            Err(ApiError::Network { detail }) => {
                debug!(url, detail, "retrying GET after transport failure");
                self.execute(self.client.get(url)).await
            }
            other => other,
        }
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.client.post(url).json(body)).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.client.put(url).json(body)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_transport_error)?;
        decode_envelope(response).await
    }
}

async fn decode_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = response.bytes().await.map_err(map_transport_error)?;

    if !content_type.contains("application/json") {
        return Err(ApiError::Server {
            detail: format!(
                "unexpected content type '{content_type}' (status {})",
                status.as_u16()
            ),
        });
    }

    let envelope: Envelope<T> = serde_json::from_slice(&body).map_err(|err| ApiError::Server {
        detail: format!("invalid JSON payload: {err}"),
    })?;

    if envelope.success {
        envelope.data.ok_or_else(|| ApiError::Server {
            detail: "success response without data".to_string(),
        })
    } else {
        match envelope.error {
            Some(error) => Err(ApiError::Api {
                message: error.message,
                code: error.code,
            }),
            None => Err(ApiError::Server {
                detail: format!("status {} without error body", status.as_u16()),
            }),
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    ApiError::Network {
        detail: error.to_string(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantDetailsBody<'a> {
    application_id: &'a ApplicationId,
    applicant_details: &'a MainApplicant,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantDetailsUpdate<'a> {
    applicant_details: &'a MainApplicant,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentsBody<'a> {
    application_id: &'a ApplicationId,
    documents: &'a DocumentSet,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentsUpdate<'a> {
    documents: &'a DocumentSet,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantBody<'a> {
    application_id: &'a ApplicationId,
    applicant: &'a AdditionalApplicant,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantUpdate<'a> {
    applicant: &'a AdditionalApplicant,
}

#[async_trait]
impl VisaBackend for HttpBackend {
    async fn get_application(&self, id: &ApplicationId) -> Result<Application, ApiError> {
        self.get_json(&self.turkey_url(&format!("application/{}", id.as_str())))
            .await
    }

    async fn start_application(
        &self,
        request: &StartApplicationRequest,
    ) -> Result<Application, ApiError> {
        self.post_json(&self.turkey_url("start"), request).await
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        request: &StartApplicationRequest,
    ) -> Result<Application, ApiError> {
        self.put_json(&self.turkey_url(&format!("application/{}", id.as_str())), request)
            .await
    }

    async fn save_applicant_details(
        &self,
        id: &ApplicationId,
        details: &MainApplicant,
    ) -> Result<MainApplicant, ApiError> {
        let body = ApplicantDetailsBody {
            application_id: id,
            applicant_details: details,
        };
        self.post_json(&self.turkey_url("applicant-details"), &body)
            .await
    }

    async fn update_applicant_details(
        &self,
        id: &ApplicationId,
        details: &MainApplicant,
    ) -> Result<MainApplicant, ApiError> {
        let body = ApplicantDetailsUpdate {
            applicant_details: details,
        };
        self.put_json(
            &self.turkey_url(&format!("applicant-details/{}", id.as_str())),
            &body,
        )
        .await
    }

    async fn upload_documents(
        &self,
        id: &ApplicationId,
        documents: &DocumentSet,
    ) -> Result<DocumentSet, ApiError> {
        let body = DocumentsBody {
            application_id: id,
            documents,
        };
        self.post_json(&self.turkey_url("documents"), &body).await
    }

    async fn update_documents(
        &self,
        id: &ApplicationId,
        documents: &DocumentSet,
    ) -> Result<DocumentSet, ApiError> {
        let body = DocumentsUpdate { documents };
        self.put_json(&self.turkey_url(&format!("documents/{}", id.as_str())), &body)
            .await
    }

    async fn add_applicant(
        &self,
        id: &ApplicationId,
        applicant: &AdditionalApplicant,
    ) -> Result<Vec<AdditionalApplicant>, ApiError> {
        let body = ApplicantBody {
            application_id: id,
            applicant,
        };
        self.post_json(&self.turkey_url("add-applicant"), &body).await
    }

    async fn update_applicant(
        &self,
        id: &ApplicationId,
        index: usize,
        applicant: &AdditionalApplicant,
    ) -> Result<Vec<AdditionalApplicant>, ApiError> {
        let body = ApplicantUpdate { applicant };
        self.put_json(
            &self.turkey_url(&format!("add-applicant/{}/{index}", id.as_str())),
            &body,
        )
        .await
    }

    async fn delete_applicant(
        &self,
        id: &ApplicationId,
        index: usize,
    ) -> Result<Vec<AdditionalApplicant>, ApiError> {
        let url = self.turkey_url(&format!("add-applicant/{}/{index}", id.as_str()));
        self.execute(self.client.delete(&url)).await
    }

    async fn get_payment_by_application_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Payment, ApiError> {
        self.get_json(&self.payment_url(id)).await
    }

    async fn upload_files(
        &self,
        files: Vec<MediaFile>,
        folder: &str,
    ) -> Result<Vec<MediaUpload>, ApiError> {
        let mut form = Form::new().text("folder", folder.to_string());
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)
                .map_err(|err| ApiError::Server {
                    detail: format!("invalid upload content type: {err}"),
                })?;
            form = form.part("documents[]", part);
        }
        let url = format!("{}/multiple/document", self.media_base_url);
        self.execute(self.client.post(&url).multipart(form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HttpBackend {
        HttpBackend::new(&ApiConfig {
            base_url: "http://localhost:3000/api/v1/".to_string(),
            media_base_url: "http://localhost:4000/api/media".to_string(),
            timeout_secs: 5,
        })
        .expect("client builds")
    }

    #[test]
    fn trims_trailing_slashes_from_base_urls() {
        let backend = backend();
        assert_eq!(
            backend.turkey_url("start"),
            "http://localhost:3000/api/v1/turkey/start"
        );
    }

    #[test]
    fn payment_lookup_lives_under_the_payment_prefix() {
        let backend = backend();
        let id = ApplicationId::parse("TUR-A1B2C3D4").expect("id");
        assert_eq!(
            backend.payment_url(&id),
            "http://localhost:3000/api/v1/payment/application/TUR-A1B2C3D4"
        );
    }

    #[test]
    fn applicant_bodies_serialise_in_camel_case() {
        let id = ApplicationId::parse("TUR-A1B2C3D4").expect("id");
        let details = MainApplicant {
            arrival_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 1).expect("date"),
            given_names: "ANNA".to_string(),
            surname: "KOVACS".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 3, 12).expect("date"),
            place_of_birth: "Budapest".to_string(),
            mother_name: "EVA KOVACS".to_string(),
            father_name: "PETER KOVACS".to_string(),
            passport_number: "HU1234567".to_string(),
            passport_issue_date: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
            passport_expiry_date: chrono::NaiveDate::from_ymd_opt(2030, 1, 1).expect("date"),
        };
        let body = ApplicantDetailsBody {
            application_id: &id,
            applicant_details: &details,
        };
        let json = serde_json::to_value(&body).expect("serialise");
        assert_eq!(json["applicationId"], "TUR-A1B2C3D4");
        assert_eq!(json["applicantDetails"]["givenNames"], "ANNA");
    }
}
