//! Document-upload schema: supporting documents plus free-form uploads.

use crate::domain::{DocumentSet, SupportingDocument, SupportingDocumentType, UploadedDocument};

use super::{is_http_url, parse_iso_date, push_error, FieldErrors};

pub const MAX_SUPPORTING_DOCUMENTS: usize = 5;
pub const MAX_ADDITIONAL_DOCUMENTS: usize = 10;

/// Raw form values for one supporting document row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportingDocumentForm {
    pub document_type: String,
    pub issuing_country: String,
    pub document_number: String,
    pub expiry_date: String,
    pub is_unlimited: bool,
}

impl Default for SupportingDocumentForm {
    /// A fresh row defaults to the visa document type, matching the blank row
    /// the form seeds for new applicants.
    fn default() -> Self {
        Self {
            document_type: "visa".to_string(),
            issuing_country: String::new(),
            document_number: String::new(),
            expiry_date: String::new(),
            is_unlimited: false,
        }
    }
}

impl SupportingDocumentForm {
    pub fn from_document(document: &SupportingDocument) -> Self {
        Self {
            document_type: document.document_type.label().to_string(),
            issuing_country: document.issuing_country.clone(),
            document_number: document.document_number.clone(),
            expiry_date: document
                .expiry_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            is_unlimited: document.is_unlimited,
        }
    }
}

/// Raw form values for the documents step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUploadForm {
    pub supporting_documents: Vec<SupportingDocumentForm>,
    pub additional_documents: Vec<UploadedDocument>,
}

impl DocumentUploadForm {
    pub fn from_documents(documents: &DocumentSet) -> Self {
        Self {
            supporting_documents: documents
                .supporting_documents
                .iter()
                .map(SupportingDocumentForm::from_document)
                .collect(),
            additional_documents: documents.additional_documents.clone(),
        }
    }
}

/// Validate the documents step: row-level rules, list caps, and the
/// at-least-one-document requirement.
pub fn validate_document_upload(form: &DocumentUploadForm) -> Result<DocumentSet, FieldErrors> {
    let mut errors = FieldErrors::new();

    if form.supporting_documents.len() > MAX_SUPPORTING_DOCUMENTS {
        push_error(
            &mut errors,
            "supportingDocuments",
            "Maximum 5 supporting documents allowed",
        );
    }
    if form.additional_documents.len() > MAX_ADDITIONAL_DOCUMENTS {
        push_error(
            &mut errors,
            "additionalDocuments",
            "Maximum 10 additional documents allowed",
        );
    }
    if form.supporting_documents.is_empty() && form.additional_documents.is_empty() {
        push_error(
            &mut errors,
            "supportingDocuments",
            "At least one document (supporting or additional) is required",
        );
    }

    let supporting_documents: Vec<SupportingDocument> = form
        .supporting_documents
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            validate_supporting_document(row, &format!("supportingDocuments[{index}]"), &mut errors)
        })
        .collect();

    for (index, document) in form.additional_documents.iter().enumerate() {
        let path = format!("additionalDocuments[{index}]");
        if document.name.is_empty() {
            push_error(&mut errors, format!("{path}.name"), "Document name is required");
        } else if document.name.chars().count() > 100 {
            push_error(&mut errors, format!("{path}.name"), "Document name is too long");
        }
        if !is_http_url(&document.url) {
            push_error(&mut errors, format!("{path}.url"), "Invalid document URL");
        }
    }

    if errors.is_empty() {
        Ok(DocumentSet {
            supporting_documents,
            additional_documents: form.additional_documents.clone(),
        })
    } else {
        Err(errors)
    }
}

/// Validate one supporting document row, reporting errors under `path_prefix`.
///
/// The unlimited/expiry cross-field rule reports on the `expiryDate` path:
/// an unlimited document must not carry an expiry date, a limited one must.
pub(super) fn validate_supporting_document(
    form: &SupportingDocumentForm,
    path_prefix: &str,
    errors: &mut FieldErrors,
) -> Option<SupportingDocument> {
    let mut ok = true;

    let document_type = match SupportingDocumentType::parse(form.document_type.trim()) {
        Some(document_type) => Some(document_type),
        None => {
            push_error(
                errors,
                format!("{path_prefix}.documentType"),
                "Invalid document type selected",
            );
            ok = false;
            None
        }
    };

    let issuing_country = form.issuing_country.trim();
    if issuing_country.is_empty() {
        push_error(
            errors,
            format!("{path_prefix}.issuingCountry"),
            "Issuing country is required",
        );
        ok = false;
    } else if issuing_country.chars().count() > 100 {
        push_error(
            errors,
            format!("{path_prefix}.issuingCountry"),
            "Issuing country name is too long",
        );
        ok = false;
    }

    let document_number = form.document_number.trim();
    if document_number.is_empty() {
        push_error(
            errors,
            format!("{path_prefix}.documentNumber"),
            "Document number is required",
        );
        ok = false;
    } else if document_number.chars().count() > 50 {
        push_error(
            errors,
            format!("{path_prefix}.documentNumber"),
            "Document number is too long",
        );
        ok = false;
    }

    let raw_expiry = form.expiry_date.trim();
    let expiry_date = if form.is_unlimited {
        if !raw_expiry.is_empty() {
            push_error(
                errors,
                format!("{path_prefix}.expiryDate"),
                "Expiry date is required unless document has unlimited validity",
            );
            ok = false;
        }
        None
    } else if raw_expiry.is_empty() {
        push_error(
            errors,
            format!("{path_prefix}.expiryDate"),
            "Expiry date is required unless document has unlimited validity",
        );
        ok = false;
        None
    } else {
        match parse_iso_date(raw_expiry) {
            Some(date) => Some(date),
            None => {
                push_error(
                    errors,
                    format!("{path_prefix}.expiryDate"),
                    "Expiry date is required unless document has unlimited validity",
                );
                ok = false;
                None
            }
        }
    };

    if !ok {
        return None;
    }

    Some(SupportingDocument {
        document_type: document_type?,
        issuing_country: issuing_country.to_string(),
        document_number: document_number.to_string(),
        expiry_date,
        is_unlimited: form.is_unlimited,
    })
}
