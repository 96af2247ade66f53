use std::path::PathBuf;
use std::time::Duration;

/// Process configuration, resolved once at startup and passed down
/// explicitly. Nothing below this layer reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub db: DbConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log: LogConfig::from_env(),
            db: DbConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub file_logs_enabled: bool,
    pub dir: PathBuf,
}

impl LogConfig {
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let file_logs_enabled = env_bool("ENABLE_FILE_LOGS", false);
        let dir = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"));

        Self {
            level,
            file_logs_enabled,
            dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let max_connections = env_u32("DB_MAX_CONNECTIONS", 5);
        let busy_timeout_ms = env_u64("DB_BUSY_TIMEOUT_MS", 5000);

        Self {
            path,
            max_connections,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        }
    }

    /// Configuration for a store at an explicit path, with the defaults
    /// used everywhere else. Tests build their stores through this.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hsk-deck")
        .join("deck.db")
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}
