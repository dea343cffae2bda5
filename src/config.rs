use std::env;
use std::net::SocketAddr;
use std::time::Duration;

// Defaults mirror the development setup; everything is overridable from the
// environment so deployments never need a config file.
const DEFAULT_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_JWT_SECRET: &str = "finvo-secret-key";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_QUOTE_REFRESH_SECS: u64 = 300;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Optional upstream quote feed. When unset the built-in quote table is
    /// served as-is.
    pub quotes_url: Option<String>,
    pub quote_refresh_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let addr = env::var("FINVO_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| format!("invalid FINVO_ADDR: {e}"))?;

        let jwt_secret =
            env::var("FINVO_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        let token_ttl_hours = match env::var("FINVO_TOKEN_TTL_HOURS") {
            Ok(v) => v
                .parse::<i64>()
                .map_err(|e| format!("invalid FINVO_TOKEN_TTL_HOURS: {e}"))?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        let quotes_url = env::var("FINVO_QUOTES_URL").ok().filter(|s| !s.is_empty());

        let quote_refresh_interval = match env::var("FINVO_QUOTE_REFRESH_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse::<u64>()
                    .map_err(|e| format!("invalid FINVO_QUOTE_REFRESH_SECS: {e}"))?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_QUOTE_REFRESH_SECS),
        };

        Ok(Config {
            addr,
            jwt_secret,
            token_ttl_hours,
            quotes_url,
            quote_refresh_interval,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: DEFAULT_ADDR.parse().unwrap(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            quotes_url: None,
            quote_refresh_interval: Duration::from_secs(DEFAULT_QUOTE_REFRESH_SECS),
        }
    }
}
