use std::env;
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

// --- CONFIG AGGREGATOR ---

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

impl Config {
    pub fn global() -> &'static Config {
        CONFIG.get_or_init(Self::load)
    }

    fn load() -> Self {
        dotenv::dotenv().ok();
        Self {
            server: ServerConfig::load(),
            store: StoreConfig::load(),
        }
    }
}

// --- MODULES ---

// SERVER
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl ServerConfig {
    fn load() -> Self {
        Self {
            host:      get_env("PUSH_HOST", "127.0.0.1"),
            port:      get_env("PUSH_PORT", "18889"),
            log_level: get_env("PUSH_LOG", "info"),
        }
    }
}

// STORE
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the token file. Required; startup fails without it.
    pub token_file: Option<String>,
    /// Unix socket path of the redis instance. Unset selects the in-memory store.
    pub redis_socket: Option<String>,
    pub cleanup_interval_secs: u64,
}

impl StoreConfig {
    fn load() -> Self {
        Self {
            token_file:            env::var("TOKEN_FILE").ok(),
            redis_socket:          env::var("REDIS_SOCKET").ok(),
            cleanup_interval_secs: get_env("STORE_CLEANUP_INTERVAL_SECS", "60"),
        }
    }
}

// --- PRIVATE HELPER ---

fn get_env<T: std::str::FromStr>(key: &str, default: &str) -> T {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| format!("Config error: {} must be valid", key))
        .unwrap()
}
