#[macro_use]
extern crate rust_i18n;

mod assistant;
mod components;
mod config;
mod error;
mod shutdown;
mod startup;
mod utils;

use tracing::info;

// Initialize i18n
i18n!("locales", fallback = "en");

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Agendita");

    // Load configuration
    let config = startup::load_config().await?;

    // Run the console assistant
    startup::run_assistant(config).await
}
