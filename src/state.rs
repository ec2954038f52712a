use std::sync::Arc;

use crate::config::Config;
use crate::db::gateway::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(config: Config, gateway: Gateway) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
        }
    }
}

/// State backed by a fresh in-memory store, with a cheap bcrypt cost.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::config::DatabaseConfig;

    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.database = DatabaseConfig {
        url: Some(":memory:".into()),
        name: Some("test".into()),
    };
    let gateway = crate::db::connect(&config.database);
    AppState::new(config, gateway)
}

/// State with no store configured.
#[cfg(test)]
pub(crate) fn disconnected_test_state() -> AppState {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    AppState::new(config, Gateway::disconnected())
}
