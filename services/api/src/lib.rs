mod cli;
pub mod error;
mod infra;
mod report;
mod routes;
mod server;

use error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
