//! Schema for additional applicants.
//!
//! Mirrors the primary-applicant rules with three inherited differences that
//! stay step-specific: no adult age floor (dependents may be minors), no
//! uppercase coercion of name input, and a 10-year bound on passport expiry.
//! Each additional applicant also carries their own document set with at
//! least one supporting document.

use chrono::NaiveDate;

use crate::domain::AdditionalApplicant;

use super::applicant::{validate_applicant_fields, ApplicantDetailsForm};
use super::documents::{validate_supporting_document, SupportingDocumentForm};
use super::{push_error, ApplicantRules, FieldErrors};
use crate::domain::{DocumentSet, UploadedDocument};

/// Raw form values for one additional applicant.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalApplicantForm {
    pub applicant: ApplicantDetailsForm,
    pub supporting_documents: Vec<SupportingDocumentForm>,
    pub additional_documents: Vec<UploadedDocument>,
}

impl AdditionalApplicantForm {
    /// Blank form seeded with one empty visa supporting-document row.
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            applicant: ApplicantDetailsForm::default_for(today),
            supporting_documents: vec![SupportingDocumentForm::default()],
            additional_documents: Vec::new(),
        }
    }

    pub fn from_applicant(applicant: &AdditionalApplicant) -> Self {
        let main = crate::domain::MainApplicant {
            arrival_date: applicant.arrival_date,
            given_names: applicant.given_names.clone(),
            surname: applicant.surname.clone(),
            date_of_birth: applicant.date_of_birth,
            place_of_birth: applicant.place_of_birth.clone(),
            mother_name: applicant.mother_name.clone(),
            father_name: applicant.father_name.clone(),
            passport_number: applicant.passport_number.clone(),
            passport_issue_date: applicant.passport_issue_date,
            passport_expiry_date: applicant.passport_expiry_date,
        };
        let supporting_documents = if applicant.documents.supporting_documents.is_empty() {
            vec![SupportingDocumentForm::default()]
        } else {
            applicant
                .documents
                .supporting_documents
                .iter()
                .map(SupportingDocumentForm::from_document)
                .collect()
        };
        Self {
            applicant: ApplicantDetailsForm::from_applicant(&main),
            supporting_documents,
            additional_documents: applicant.documents.additional_documents.clone(),
        }
    }
}

const ADDITIONAL_APPLICANT_RULES: ApplicantRules = ApplicantRules {
    adult_only: false,
    uppercase_input: false,
    expiry_horizon_years: Some(10),
};

pub fn validate_additional_applicant(
    form: &AdditionalApplicantForm,
    today: NaiveDate,
) -> Result<AdditionalApplicant, FieldErrors> {
    let mut errors = FieldErrors::new();

    let applicant = match validate_applicant_fields(&form.applicant, today, &ADDITIONAL_APPLICANT_RULES)
    {
        Ok(applicant) => Some(applicant),
        Err(applicant_errors) => {
            errors.extend(applicant_errors);
            None
        }
    };

    if form.supporting_documents.is_empty() {
        push_error(
            &mut errors,
            "documents.supportingDocuments",
            "At least one supporting document is required",
        );
    }

    let supporting_documents: Vec<_> = form
        .supporting_documents
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            validate_supporting_document(
                row,
                &format!("documents.supportingDocuments[{index}]"),
                &mut errors,
            )
        })
        .collect();

    let applicant = match (applicant, errors.is_empty()) {
        (Some(applicant), true) => applicant,
        _ => return Err(errors),
    };

    Ok(AdditionalApplicant {
        arrival_date: applicant.arrival_date,
        given_names: applicant.given_names,
        surname: applicant.surname,
        date_of_birth: applicant.date_of_birth,
        place_of_birth: applicant.place_of_birth,
        mother_name: applicant.mother_name,
        father_name: applicant.father_name,
        passport_number: applicant.passport_number,
        passport_issue_date: applicant.passport_issue_date,
        passport_expiry_date: applicant.passport_expiry_date,
        documents: DocumentSet {
            supporting_documents,
            additional_documents: form.additional_documents.clone(),
        },
    })
}
