mod cli;
mod infra;
mod report;
mod routes;
mod server;

use tenant_screen::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
