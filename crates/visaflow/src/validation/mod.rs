//! Per-step form schemas.
//!
//! Each schema takes the raw string values a form collects and returns either
//! a typed domain value or a map from field path to human-readable message.
//! Validation never leaves the device and always blocks submission.

use std::collections::BTreeMap;

use chrono::{Duration, Months, NaiveDate};

mod additional;
mod applicant;
mod documents;
mod start;

pub use additional::{validate_additional_applicant, AdditionalApplicantForm};
pub use applicant::{validate_main_applicant, ApplicantDetailsForm};
pub use documents::{
    validate_document_upload, DocumentUploadForm, SupportingDocumentForm,
    MAX_ADDITIONAL_DOCUMENTS, MAX_SUPPORTING_DOCUMENTS,
};
pub use start::{validate_start_application, StartApplicationForm};

/// Field path → first error message for that field.
pub type FieldErrors = BTreeMap<String, String>;

pub(crate) fn push_error(errors: &mut FieldErrors, path: impl Into<String>, message: &str) {
    errors.entry(path.into()).or_insert_with(|| message.to_string());
}

/// Earliest accepted date of birth.
pub const DATE_OF_BIRTH_FLOOR: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => unreachable!(),
};

/// E-visa validity window counted from the arrival date.
pub const VISA_VALIDITY_DAYS: i64 = 180;

/// Maximum continuous stay, displayed alongside the validity window but not
/// enforced beyond the passport-expiry date bound.
pub const MAX_STAY_DAYS: i64 = 30;

/// The passport must outlive the visa validity window, so the earliest
/// accepted expiry is arrival + 180 days.
pub fn passport_expiry_floor(arrival: NaiveDate) -> NaiveDate {
    arrival + Duration::days(VISA_VALIDITY_DAYS)
}

/// Default expiry auto-filled when the arrival date changes. Identical to the
/// floor: the form pre-fills the least restrictive accepted value.
pub fn default_passport_expiry(arrival: NaiveDate) -> NaiveDate {
    passport_expiry_floor(arrival)
}

/// Informational banner shown under the arrival date field.
pub fn visa_validity_message(arrival: NaiveDate) -> String {
    let until = arrival + Duration::days(VISA_VALIDITY_DAYS);
    format!(
        "Your e-visa is valid from {} to {} for a total period of {VISA_VALIDITY_DAYS} days. \
         Your stay cannot exceed {MAX_STAY_DAYS} days.",
        arrival.format("%-d %B %Y"),
        until.format("%-d %B %Y"),
    )
}

pub(crate) fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Why a free-text name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameIssue {
    Required,
    TooLong,
    Charset,
}

/// Names accept letters, whitespace, hyphens, and apostrophes, up to 100
/// characters.
pub(crate) fn check_name(value: &str) -> Option<NameIssue> {
    if value.is_empty() {
        return Some(NameIssue::Required);
    }
    if value.chars().count() > 100 {
        return Some(NameIssue::TooLong);
    }
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '\'' || c == '-');
    if valid {
        None
    } else {
        Some(NameIssue::Charset)
    }
}

pub(crate) fn is_valid_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !raw.chars().any(char::is_whitespace)
}

pub(crate) fn is_http_url(raw: &str) -> bool {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"));
    matches!(rest, Some(rest) if !rest.is_empty() && !rest.starts_with('/'))
}

/// Shared applicant date rules. The two schema variants diverge on the age
/// floor and the expiry horizon; both divergences are inherited behavior and
/// intentionally not unified.
pub(crate) struct ApplicantRules {
    /// Require age >= 18 (primary applicant only).
    pub adult_only: bool,
    /// Coerce names and passport number to uppercase before validating.
    pub uppercase_input: bool,
    /// Bound passport expiry to this many years from today, when set.
    pub expiry_horizon_years: Option<u32>,
}

pub(crate) fn expiry_horizon(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_add_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn expiry_floor_is_arrival_plus_180_days() {
        let arrival = date(2026, 3, 1);
        assert_eq!(passport_expiry_floor(arrival), date(2026, 8, 28));
        assert_eq!(default_passport_expiry(arrival), passport_expiry_floor(arrival));
    }

    #[test]
    fn validity_message_spells_out_the_window() {
        let message = visa_validity_message(date(2026, 3, 1));
        assert!(message.contains("1 March 2026"));
        assert!(message.contains("28 August 2026"));
        assert!(message.contains("180 days"));
        assert!(message.contains("30 days"));
    }

    #[test]
    fn name_rules_match_the_passport_charset() {
        assert_eq!(check_name("MARY ANNE O'BRIEN-SMITH"), None);
        assert_eq!(check_name(""), Some(NameIssue::Required));
        assert_eq!(check_name(&"A".repeat(101)), Some(NameIssue::TooLong));
        assert_eq!(check_name("J0HN"), Some(NameIssue::Charset));
    }

    #[test]
    fn email_check_requires_local_part_and_dotted_domain() {
        assert!(is_valid_email("applicant@example.com"));
        assert!(!is_valid_email("applicant@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn url_check_accepts_http_and_https_only() {
        assert!(is_http_url("https://media.example.com/doc.pdf"));
        assert!(is_http_url("http://media.example.com/doc.pdf"));
        assert!(!is_http_url("ftp://media.example.com/doc.pdf"));
        assert!(!is_http_url("https:///doc.pdf"));
    }
}
