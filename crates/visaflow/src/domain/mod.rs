//! Wire-compatible domain model for the Turkey e-visa backend.
//!
//! `Application` and `Payment` are server-owned aggregates; the client only
//! holds a possibly-stale cached copy of them. Everything here serializes in
//! the backend's camelCase convention.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier wrapper for server-issued application IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Parse a user-supplied ID, enforcing the `TUR-` + 8..=12 uppercase
    /// alphanumeric format the backend issues.
    pub fn parse(raw: &str) -> Result<Self, InvalidApplicationId> {
        if is_valid_application_id(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidApplicationId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks the `TUR-[A-Z0-9]{8,12}` format without constructing an ID.
pub fn is_valid_application_id(raw: &str) -> bool {
    let Some(suffix) = raw.strip_prefix("TUR-") else {
        return false;
    };
    (8..=12).contains(&suffix.len())
        && suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[derive(Debug, thiserror::Error)]
#[error("application ID must look like TUR-A1B2C3D4")]
pub struct InvalidApplicationId;

/// Lifecycle states the backend reports for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Started,
    InProgress,
    Submitted,
    Paid,
    Approved,
    Rejected,
    /// Catch-all for statuses this client version does not know about.
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Started => "started",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Paid => "paid",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Unknown => "unknown",
        }
    }

    /// Human-facing status text shown on the status screen.
    pub const fn display_text(self) -> &'static str {
        match self {
            ApplicationStatus::Started => "Application Started",
            ApplicationStatus::InProgress => "In Progress",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Paid => "Payment Completed",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Payload for starting (or re-submitting) the trip selection step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartApplicationRequest {
    pub passport_country: String,
    pub travel_document: String,
    pub visa_type: String,
    pub destination: String,
    pub email: String,
}

/// The server-owned application aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: ApplicationId,
    pub passport_country: String,
    pub travel_document: String,
    pub visa_type: String,
    pub destination: String,
    pub email: String,
    pub status: ApplicationStatus,
    pub current_step: u8,
    #[serde(default)]
    pub visa_fee: u32,
    #[serde(default)]
    pub service_fee: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_applicant: Option<MainApplicant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<DocumentSet>,
    #[serde(default)]
    pub additional_applicants: Vec<AdditionalApplicant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Total charge displayed in the fee breakdown (fees are set server-side).
    pub const fn total_fee(&self) -> u32 {
        self.visa_fee + self.service_fee
    }
}

/// Personal and passport details for the primary applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainApplicant {
    pub arrival_date: NaiveDate,
    pub given_names: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub mother_name: String,
    pub father_name: String,
    pub passport_number: String,
    pub passport_issue_date: NaiveDate,
    pub passport_expiry_date: NaiveDate,
}

/// A companion traveller: the same personal record plus their own documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalApplicant {
    pub arrival_date: NaiveDate,
    pub given_names: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub mother_name: String,
    pub father_name: String,
    pub passport_number: String,
    pub passport_issue_date: NaiveDate,
    pub passport_expiry_date: NaiveDate,
    #[serde(default)]
    pub documents: DocumentSet,
}

/// The documents attached to an application or an additional applicant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSet {
    #[serde(default)]
    pub supporting_documents: Vec<SupportingDocument>,
    #[serde(default)]
    pub additional_documents: Vec<UploadedDocument>,
}

impl DocumentSet {
    pub fn is_empty(&self) -> bool {
        self.supporting_documents.is_empty() && self.additional_documents.is_empty()
    }
}

/// Kind of evidence document. The backend historically accepted both the
/// display form and a kebab-case form on the wire; both are decoded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportingDocumentType {
    Visa,
    ResidencePermit,
}

impl SupportingDocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            SupportingDocumentType::Visa => "Visa",
            SupportingDocumentType::ResidencePermit => "Residence Permit",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Visa" | "visa" => Some(Self::Visa),
            "Residence Permit" | "residence-permit" => Some(Self::ResidencePermit),
            _ => None,
        }
    }
}

impl Serialize for SupportingDocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for SupportingDocumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| D::Error::custom(format!("unknown supporting document type '{raw}'")))
    }
}

/// A visa or residence permit attached as evidence.
///
/// Invariant: `is_unlimited == true` exactly when `expiry_date` is absent.
/// The validation layer enforces this before anything reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingDocument {
    pub document_type: SupportingDocumentType,
    pub issuing_country: String,
    pub document_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_unlimited: bool,
}

/// A file already uploaded to the media host and referenced by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Result entry returned by the media host for each uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

/// In-memory handle to a file selected for upload.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Server-owned payment record, fetched read-only for the receipt view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_id: String,
    pub transaction_id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub payer_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
