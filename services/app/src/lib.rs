mod cli;
mod commands;

use visaflow::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
