use std::error::Error;

use tokio::signal;
use tracing::info;

use crate::config::Config;
use crate::market;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the state, start background work and serve until shutdown.
pub async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let state = AppState::new(config.clone());

    if let Some(url) = config.quotes_url.clone() {
        info!(%url, "starting quote refresh task");
        tokio::spawn(market::refresh_loop(
            url,
            config.quote_refresh_interval,
            state.quotes.clone(),
        ));
    }

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("finvo listening on http://{}", config.addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("received SIGTERM, shutting down gracefully");
        },
    }
}
