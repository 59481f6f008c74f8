use std::sync::Arc;

use chrono::Duration;

use crate::config::{Config, CorsConfig, DatabaseConfig, LoggingConfig, ServerConfig, SignupConfig};
use crate::storage::Store;
use crate::AppState;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        cors: CorsConfig {
            origins: "*".to_string(),
        },
        signup: SignupConfig {
            pending_ttl_secs: 3600,
        },
    }
}

pub fn create_test_state() -> Arc<AppState> {
    let config = test_config();
    let store = Store::new(
        &config.database.url,
        Duration::seconds(config.signup.pending_ttl_secs as i64),
    )
    .expect("in-memory store");

    Arc::new(AppState {
        config,
        store: Arc::new(store),
    })
}
