mod board;
mod config;
mod display;
mod providers;
mod sync;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Options;
use display::{console::ConsolePresenter, Presenter};
use providers::tfl::TflClient;
use sync::RefreshManager;

#[tokio::main]
async fn main() -> ExitCode {
    let options = Options::parse();

    // Initialize tracing; --debug lowers the default filter.
    let default_filter = if options.debug {
        "pibus=debug"
    } else {
        "pibus=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match options.into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(1);
        }
    };

    let client = match TflClient::new(&settings.base_url) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::from(1);
        }
    };

    let presenter = select_presenter();

    let manager = Arc::new(RefreshManager::new(
        client,
        settings.bus_stop,
        settings.bus_line,
    ));

    tokio::select! {
        _ = manager.start(presenter) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    ExitCode::SUCCESS
}

/// Prefer the e-ink panel when compiled in; degrade to console output for
/// the lifetime of the process if no panel comes up.
fn select_presenter() -> Box<dyn Presenter> {
    #[cfg(feature = "epd")]
    {
        match display::epd::EpdPresenter::new() {
            Ok(panel) => return Box::new(panel),
            Err(e) => {
                tracing::warn!(error = %e, "No panel found, falling back to console output");
            }
        }
    }

    Box::new(ConsolePresenter)
}
