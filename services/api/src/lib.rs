mod catalog;
mod cli;
mod infra;
mod interactive;
mod routes;
mod sample;
mod server;

use strainpoint::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
