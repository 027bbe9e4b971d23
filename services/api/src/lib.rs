mod cli;
mod console;
mod demo;
mod infra;
mod routes;
mod server;

use inaproperty::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
