//! Personal-information schema for the primary applicant.
//!
//! The primary applicant must be an adult and the form uppercases name and
//! passport input before validating. The additional-applicant schema differs
//! on both points (see [`super::additional`]); the divergence is inherited
//! product behavior and deliberately kept step-specific.

use chrono::NaiveDate;

use crate::domain::MainApplicant;

use super::{
    check_name, default_passport_expiry, expiry_horizon, parse_iso_date, push_error,
    ApplicantRules, FieldErrors, NameIssue, DATE_OF_BIRTH_FLOOR,
};

/// Raw form values for the applicant-details step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantDetailsForm {
    pub arrival_date: String,
    pub given_names: String,
    pub surname: String,
    pub date_of_birth: String,
    pub place_of_birth: String,
    pub mother_name: String,
    pub father_name: String,
    pub passport_number: String,
    pub passport_issue_date: String,
    pub passport_expiry_date: String,
}

impl ApplicantDetailsForm {
    /// Blank form with arrival defaulting to today and the passport expiry
    /// auto-filled 180 days out.
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            arrival_date: today.format("%Y-%m-%d").to_string(),
            passport_expiry_date: default_passport_expiry(today)
                .format("%Y-%m-%d")
                .to_string(),
            ..Self::default()
        }
    }

    pub fn from_applicant(applicant: &MainApplicant) -> Self {
        Self {
            arrival_date: applicant.arrival_date.format("%Y-%m-%d").to_string(),
            given_names: applicant.given_names.clone(),
            surname: applicant.surname.clone(),
            date_of_birth: applicant.date_of_birth.format("%Y-%m-%d").to_string(),
            place_of_birth: applicant.place_of_birth.clone(),
            mother_name: applicant.mother_name.clone(),
            father_name: applicant.father_name.clone(),
            passport_number: applicant.passport_number.clone(),
            passport_issue_date: applicant.passport_issue_date.format("%Y-%m-%d").to_string(),
            passport_expiry_date: applicant
                .passport_expiry_date
                .format("%Y-%m-%d")
                .to_string(),
        }
    }
}

const MAIN_APPLICANT_RULES: ApplicantRules = ApplicantRules {
    adult_only: true,
    uppercase_input: true,
    expiry_horizon_years: None,
};

/// Validate the primary applicant's details against today's date.
pub fn validate_main_applicant(
    form: &ApplicantDetailsForm,
    today: NaiveDate,
) -> Result<MainApplicant, FieldErrors> {
    validate_applicant_fields(form, today, &MAIN_APPLICANT_RULES)
}

pub(super) fn validate_applicant_fields(
    form: &ApplicantDetailsForm,
    today: NaiveDate,
    rules: &ApplicantRules,
) -> Result<MainApplicant, FieldErrors> {
    let mut errors = FieldErrors::new();

    let coerce = |value: &str| {
        let trimmed = value.trim();
        if rules.uppercase_input {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    };

    let given_names = coerce(&form.given_names);
    let surname = coerce(&form.surname);
    let mother_name = coerce(&form.mother_name);
    let father_name = coerce(&form.father_name);
    let passport_number = coerce(&form.passport_number);
    let place_of_birth = form.place_of_birth.trim().to_string();

    validate_name_field(
        &mut errors,
        "givenNames",
        &given_names,
        "Given names are required",
        "Given names are too long",
        "Given names can only contain letters, spaces, hyphens, and apostrophes",
    );
    validate_name_field(
        &mut errors,
        "surname",
        &surname,
        "Surname is required",
        "Surname is too long",
        "Surname can only contain letters, spaces, hyphens, and apostrophes",
    );
    validate_name_field(
        &mut errors,
        "motherName",
        &mother_name,
        "Mother's name is required",
        "Mother's name is too long",
        "Mother's name can only contain letters, spaces, hyphens, and apostrophes",
    );
    validate_name_field(
        &mut errors,
        "fatherName",
        &father_name,
        "Father's name is required",
        "Father's name is too long",
        "Father's name can only contain letters, spaces, hyphens, and apostrophes",
    );

    if place_of_birth.is_empty() {
        push_error(&mut errors, "placeOfBirth", "Place of birth is required");
    } else if place_of_birth.chars().count() > 100 {
        push_error(&mut errors, "placeOfBirth", "Place of birth is too long");
    }

    if passport_number.is_empty() {
        push_error(&mut errors, "passportNumber", "Passport number is required");
    } else if passport_number.chars().count() > 20 {
        push_error(&mut errors, "passportNumber", "Passport number is too long");
    } else if !passport_number
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        push_error(
            &mut errors,
            "passportNumber",
            "Passport number can only contain uppercase letters and numbers",
        );
    }

    let arrival_date = match parse_iso_date(&form.arrival_date) {
        Some(date) if date >= today => Some(date),
        _ => {
            push_error(
                &mut errors,
                "arrivalDate",
                "Arrival date must be today or in the future",
            );
            None
        }
    };

    let date_of_birth = match parse_iso_date(&form.date_of_birth) {
        Some(date) if date <= today && date >= DATE_OF_BIRTH_FLOOR => {
            if rules.adult_only && !is_at_least_18(date, today) {
                push_error(
                    &mut errors,
                    "dateOfBirth",
                    "Applicant must be at least 18 years old",
                );
                None
            } else {
                Some(date)
            }
        }
        _ => {
            let message = if rules.adult_only {
                "Applicant must be at least 18 years old"
            } else {
                "Please enter a valid date of birth"
            };
            push_error(&mut errors, "dateOfBirth", message);
            None
        }
    };

    let passport_issue_date = match parse_iso_date(&form.passport_issue_date) {
        Some(date) if date <= today => Some(date),
        _ => {
            push_error(
                &mut errors,
                "passportIssueDate",
                "Passport issue date cannot be in the future",
            );
            None
        }
    };

    let passport_expiry_date = match parse_iso_date(&form.passport_expiry_date) {
        Some(date) if date > today => match rules.expiry_horizon_years {
            Some(years) if date > expiry_horizon(today, years) => {
                push_error(
                    &mut errors,
                    "passportExpiryDate",
                    "Passport expiry date must be in the future and not more than 10 years from now",
                );
                None
            }
            _ => Some(date),
        },
        _ => {
            let message = if rules.expiry_horizon_years.is_some() {
                "Passport expiry date must be in the future and not more than 10 years from now"
            } else {
                "Passport must be valid (not expired)"
            };
            push_error(&mut errors, "passportExpiryDate", message);
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // every None above also pushed an error
    match (
        arrival_date,
        date_of_birth,
        passport_issue_date,
        passport_expiry_date,
    ) {
        (Some(arrival_date), Some(date_of_birth), Some(passport_issue_date), Some(passport_expiry_date)) => {
            Ok(MainApplicant {
                arrival_date,
                given_names,
                surname,
                date_of_birth,
                place_of_birth,
                mother_name,
                father_name,
                passport_number,
                passport_issue_date,
                passport_expiry_date,
            })
        }
        _ => Err(errors),
    }
}

fn validate_name_field(
    errors: &mut FieldErrors,
    path: &str,
    value: &str,
    required: &str,
    too_long: &str,
    charset: &str,
) {
    match check_name(value) {
        Some(NameIssue::Required) => push_error(errors, path, required),
        Some(NameIssue::TooLong) => push_error(errors, path, too_long),
        Some(NameIssue::Charset) => push_error(errors, path, charset),
        None => {}
    }
}

fn is_at_least_18(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    today
        .years_since(date_of_birth)
        .is_some_and(|age| age >= 18)
}
