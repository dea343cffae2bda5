use std::error::Error;

use tracing_subscriber::EnvFilter;

use finvo::{config::Config, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("finvo=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    server::run(config).await
}
