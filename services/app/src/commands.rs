use std::sync::Arc;

use clap::Args;
use tracing::debug;
use visaflow::api::{HttpBackend, VisaBackend};
use visaflow::config::AppConfig;
use visaflow::domain::{is_valid_application_id, ApplicationId};
use visaflow::error::AppError;
use visaflow::navigation::progress_text;
use visaflow::store::{DraftStore, FileStorage, OnboardingStore, SharedDraftStore};
use visaflow::telemetry;
use visaflow::wizard::{StatusCheckController, StatusCheckOutcome, WizardError};

#[derive(Args, Debug)]
pub(crate) struct StatusArgs {
    /// Application ID, e.g. TUR-A1B2C3D4
    pub(crate) id: String,
}

#[derive(Args, Debug)]
pub(crate) struct PaymentArgs {
    /// Application ID, e.g. TUR-A1B2C3D4
    pub(crate) id: String,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateIdArgs {
    /// Application ID to check
    pub(crate) id: String,
}

struct AppContext {
    backend: Arc<HttpBackend>,
    store: SharedDraftStore,
}

fn context() -> Result<AppContext, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(base_url = config.api.base_url, "backend configured");

    let backend = Arc::new(HttpBackend::new(&config.api)?);
    let storage = Arc::new(FileStorage::new(config.storage.state_dir.clone()));
    let store = DraftStore::shared(storage)?;
    Ok(AppContext { backend, store })
}

pub(crate) async fn run_status(args: StatusArgs) -> Result<(), AppError> {
    let context = context()?;
    let mut controller = StatusCheckController::new(context.backend, context.store);

    match controller.check(&args.id).await {
        Ok(StatusCheckOutcome::Found { application, next }) => {
            println!("Application {}", application.application_id.as_str());
            println!("  Status: {}", application.status.display_text());
            if let Some(progress) =
                progress_text(application.status, Some(application.current_step))
            {
                println!("  Progress: {progress}");
            }
            println!("  Next: {} ({})", next.label, next.route.path());
            println!("  {}", next.description);
            Ok(())
        }
        Ok(StatusCheckOutcome::NotFound {
            attempted_id,
            message,
        }) => {
            println!("No application found for {attempted_id}: {message}");
            Ok(())
        }
        Err(WizardError::Validation(errors)) => {
            for (field, message) in &errors {
                eprintln!("{field}: {message}");
            }
            Err(WizardError::Validation(errors).into())
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn run_payment(args: PaymentArgs) -> Result<(), AppError> {
    let context = context()?;
    let candidate = args.id.trim().to_uppercase();
    let id = match ApplicationId::parse(&candidate) {
        Ok(id) => id,
        Err(_) => {
            eprintln!("applicationId: Invalid application ID format");
            let mut errors = visaflow::validation::FieldErrors::new();
            errors.insert(
                "applicationId".to_string(),
                "Invalid application ID format".to_string(),
            );
            return Err(WizardError::Validation(errors).into());
        }
    };

    let payment = context.backend.get_payment_by_application_id(&id).await?;
    println!("Payment for {}", id.as_str());
    println!("  Payment ID: {}", payment.payment_id);
    println!("  Transaction: {}", payment.transaction_id);
    println!("  Status: {}", payment.status);
    println!("  Amount: {:.2} {}", payment.amount, payment.currency);
    println!("  Payer: {}", payment.payer_email);
    Ok(())
}

pub(crate) fn run_reset() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let storage = Arc::new(FileStorage::new(config.storage.state_dir.clone()));
    let mut draft = DraftStore::open(storage.clone())?;
    draft.reset()?;
    let mut onboarding = OnboardingStore::open(storage)?;
    onboarding.reset()?;
    println!("Cleared persisted application and onboarding state.");
    Ok(())
}

pub(crate) fn run_validate_id(args: ValidateIdArgs) -> Result<(), AppError> {
    let candidate = args.id.trim().to_uppercase();
    if is_valid_application_id(&candidate) {
        println!("{candidate} is a valid application ID.");
    } else {
        println!("{candidate} is not a valid application ID (expected TUR- followed by 8-12 letters or digits).");
    }
    Ok(())
}
