mod cli;
mod commands;
mod docs;
mod infra;
mod routes;
mod server;

use property_ledger::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
