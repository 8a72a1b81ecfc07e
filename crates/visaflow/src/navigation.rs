//! Status-driven navigation.
//!
//! Pure mapping from application status to the next screen; controllers and
//! the status check both route through here so the two can never disagree.

use crate::domain::{ApplicationId, ApplicationStatus};

pub const TOTAL_STEPS: u8 = 5;

/// Screens the wizard can route to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Start,
    ApplicantDetails,
    Documents,
    AdditionalApplicants,
    Payment,
    PaymentDetails,
    Download,
    ContactSupport,
    Status { id: ApplicationId },
    StatusNotFound { attempted_id: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Start => "/apply/start".to_string(),
            Route::ApplicantDetails => "/apply/applicant-details".to_string(),
            Route::Documents => "/apply/documents".to_string(),
            Route::AdditionalApplicants => "/apply/additional-applicants".to_string(),
            Route::Payment => "/apply/payment".to_string(),
            Route::PaymentDetails => "/payment-details".to_string(),
            Route::Download => "/download".to_string(),
            Route::ContactSupport => "/contact-support".to_string(),
            Route::Status { id } => format!("/status/{}", id.as_str()),
            Route::StatusNotFound { attempted_id } => {
                format!("/status/not-found?attempted={attempted_id}")
            }
        }
    }
}

/// What the status screen offers the applicant next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextAction {
    pub label: &'static str,
    pub description: String,
    pub route: Route,
}

/// Deterministic status-to-action table. `current_step` only shapes the
/// wording for in-progress applications.
pub fn next_action(status: ApplicationStatus, current_step: Option<u8>) -> NextAction {
    match status {
        ApplicationStatus::Started
        | ApplicationStatus::InProgress
        | ApplicationStatus::Unknown => {
            let step = current_step.unwrap_or(1).clamp(1, TOTAL_STEPS);
            NextAction {
                label: "Continue Application",
                description: format!(
                    "Your application is in progress. Continue from step {step} of {TOTAL_STEPS}."
                ),
                route: Route::ApplicantDetails,
            }
        }
        ApplicationStatus::Submitted => NextAction {
            label: "Make Payment",
            description: "Your application has been submitted. Payment is required to proceed."
                .to_string(),
            route: Route::Payment,
        },
        ApplicationStatus::Paid => NextAction {
            label: "View Payment Details",
            description: "Payment received. You can review your payment details.".to_string(),
            route: Route::PaymentDetails,
        },
        ApplicationStatus::Approved => NextAction {
            label: "Download Visa",
            description: "Your visa has been approved and is ready to download.".to_string(),
            route: Route::Download,
        },
        ApplicationStatus::Rejected => NextAction {
            label: "Contact Support",
            description: "Your application was rejected. Please contact support for next steps."
                .to_string(),
            route: Route::ContactSupport,
        },
    }
}

/// Progress line for the status screen, absent once the wizard is over.
pub fn progress_text(status: ApplicationStatus, current_step: Option<u8>) -> Option<String> {
    match status {
        ApplicationStatus::Paid | ApplicationStatus::Approved | ApplicationStatus::Rejected => {
            None
        }
        _ => {
            let step = current_step.unwrap_or(1).clamp(1, TOTAL_STEPS);
            Some(format!("Step {step} of {TOTAL_STEPS}"))
        }
    }
}
