use crate::assistant::Assistant;
use crate::components::{GmailHandle, GoogleCalendarHandle};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Initialize the Google components and run the console assistant
pub async fn run_assistant(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    // Set locale from config
    {
        let config_read = config.read().await;
        crate::utils::i18n::set_locale(&config_read.locale);
        info!("Setting locale to {}", config_read.locale);
    }

    let timezone = {
        let config_read = config.read().await;
        config_read.tz()?
    };
    info!("Using timezone {}", timezone.name());

    let calendar = GoogleCalendarHandle::new(Arc::clone(&config));
    let gmail = GmailHandle::new(Arc::clone(&config));

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Clone handles for the shutdown handler
    let shutdown_calendar = calendar.clone();
    let shutdown_gmail = gmail.clone();

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_calendar, shutdown_gmail).await;
    });

    let assistant = Assistant::new(
        Arc::clone(&config),
        calendar.clone(),
        gmail.clone(),
        timezone,
    );

    // Run the console loop in its own task so signals stay responsive
    let assistant_task = tokio::spawn(async move { assistant.run().await });

    tokio::select! {
        result = assistant_task => {
            info!("Console session ended");
            if let Err(e) = calendar.shutdown().await {
                error!("Error shutting down Google Calendar actor: {:?}", e);
            }
            if let Err(e) = gmail.shutdown().await {
                error!("Error shutting down Gmail actor: {:?}", e);
            }
            match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => {
                    error!("Assistant task error: {:?}", e);
                    Err(Error::Other(format!("Assistant task error: {}", e)).into())
                }
            }
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, closing assistant...");
            Ok(())
        }
    }
}
