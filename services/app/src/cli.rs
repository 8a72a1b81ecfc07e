use crate::commands::{
    run_payment, run_reset, run_status, run_validate_id, PaymentArgs, StatusArgs, ValidateIdArgs,
};
use clap::{Parser, Subcommand};
use visaflow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Visa Wizard",
    about = "Inspect and manage a visa application from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up an application's status and the suggested next step
    Status(StatusArgs),
    /// Show the payment receipt for an application
    Payment(PaymentArgs),
    /// Clear the locally persisted draft and onboarding state
    Reset,
    /// Check whether an application ID is well formed
    ValidateId(ValidateIdArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Status(args) => run_status(args).await,
        Command::Payment(args) => run_payment(args).await,
        Command::Reset => run_reset(),
        Command::ValidateId(args) => run_validate_id(args),
    }
}
