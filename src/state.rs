use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::User;
use crate::config::Config;
use crate::market::{self, Quote};
use crate::portfolio::Portfolio;

/// Shared application state. Stores are in-memory maps behind RwLocks; a
/// database can slot in behind the same accessors later.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Users keyed by lowercased email.
    pub users: Arc<RwLock<HashMap<String, User>>>,
    pub portfolios: Arc<RwLock<HashMap<Uuid, Portfolio>>>,
    pub quotes: Arc<RwLock<HashMap<String, Quote>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config: Arc::new(config),
            users: Arc::new(RwLock::new(HashMap::new())),
            portfolios: Arc::new(RwLock::new(HashMap::new())),
            quotes: Arc::new(RwLock::new(market::default_quotes())),
        }
    }

    pub async fn user_by_id(&self, id: Uuid) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned()
    }
}
