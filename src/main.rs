use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use little_printer::config::Config;
use little_printer::fetcher::Fetcher;
use little_printer::routes::{self, AppState};
use little_printer::settings::SettingsStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "little_printer=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load_or_default("printer.toml")?;
    info!(
        "Feed deadline {}s, settings in {}",
        config.fetch.timeout_secs,
        config.settings_dir.display()
    );

    let fetcher = Arc::new(Fetcher::new(&config.fetch)?);
    let store = SettingsStore::in_dir(&config.settings_dir);

    // Create app state
    let state = Arc::new(AppState::new(fetcher, store));

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server starting on http://{}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
