//! Shift report bot
//!
//! Long-polls Telegram and runs the shift report wizard for every private
//! chat, posting finished reports to the configured group threads.

use shift_report_bot::catalog::SqliteCatalog;
use shift_report_bot::config::BotConfig;
use shift_report_bot::health;
use shift_report_bot::runtime::{SystemClock, WizardRuntime};
use shift_report_bot::telegram::TelegramClient;
use shift_report_bot::wizard::Controller;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shift_report_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = BotConfig::from_env()?;
    let flow = Arc::new(config.flow()?);
    let routing = config.routing();
    tracing::info!(
        group_id = config.group_id,
        layout = ?routing.layout(),
        dynamic_sessions = config.dynamic_session_catalog,
        "Configuration loaded"
    );

    let client = Arc::new(TelegramClient::new(&config.bot_token, &config.api_url)?);

    let mut runtime = WizardRuntime::new(Controller::new(flow), client.clone(), SystemClock, routing);
    if config.dynamic_session_catalog {
        tracing::info!(path = %config.catalog_path.display(), "Opening session catalog");
        let catalog = SqliteCatalog::open(&config.catalog_path, config.default_role.clone())?;
        runtime = runtime.with_catalog(Arc::new(catalog));
    }

    // Shutdown on Ctrl-C
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        });
    }

    let listener = health::bind(config.port).await.inspect_err(|e| {
        tracing::error!(port = config.port, error = %e, "Failed to bind health endpoint");
    })?;
    let health = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(listener, shutdown).await {
                tracing::error!(error = %e, "Health endpoint failed");
            }
        })
    };

    runtime.run(client, shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = health.await {
        tracing::error!(error = %e, "Health task panicked");
    }

    Ok(())
}
