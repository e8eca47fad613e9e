mod cli;
mod infra;
mod routes;
mod rules;
mod server;

use hai_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
