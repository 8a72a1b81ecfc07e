//! Trip-selection schema for the start step.

use crate::domain::StartApplicationRequest;

use super::{is_valid_email, push_error, FieldErrors};

/// Raw form values for the start step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartApplicationForm {
    pub passport_country: String,
    pub travel_document: String,
    pub visa_type: String,
    pub destination: String,
    pub email: String,
}

pub fn validate_start_application(
    form: &StartApplicationForm,
) -> Result<StartApplicationRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let passport_country = form.passport_country.trim();
    if passport_country.is_empty() {
        push_error(
            &mut errors,
            "passportCountry",
            "Please select your passport country",
        );
    }

    let travel_document = form.travel_document.trim();
    if travel_document.is_empty() {
        push_error(&mut errors, "travelDocument", "Travel document is required");
    }

    let visa_type = form.visa_type.trim();
    if visa_type.is_empty() {
        push_error(&mut errors, "visaType", "Visa type is required");
    }

    let destination = form.destination.trim();
    if destination.is_empty() {
        push_error(&mut errors, "destination", "Destination is required");
    }

    let email = form.email.trim();
    if !is_valid_email(email) {
        push_error(&mut errors, "email", "Please enter a valid email address");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(StartApplicationRequest {
        passport_country: passport_country.to_string(),
        travel_document: travel_document.to_string(),
        visa_type: visa_type.to_string(),
        destination: destination.to_string(),
        email: email.to_string(),
    })
}
