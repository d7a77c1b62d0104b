use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let storage = StorageConfig::from_env(
            env::var("PROPERTY_STORE").ok().as_deref(),
            env::var("DATABASE_URL").ok(),
        )?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            storage,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

pub const DEFAULT_DATABASE_URL: &str = "sqlite://properties.db";

/// Which property store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    Sqlite { url: String },
}

impl StorageConfig {
    fn from_env(store: Option<&str>, database_url: Option<String>) -> Result<Self, ConfigError> {
        let store = store.unwrap_or("memory").trim().to_ascii_lowercase();
        match store.as_str() {
            "" | "memory" | "in-memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite {
                url: database_url
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            }),
            _ => Err(ConfigError::InvalidStore(store)),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, StorageConfig::Sqlite { .. })
    }

    /// Rejects process-local stores for commands whose writes must outlive the process.
    pub fn require_persistent(&self) -> Result<(), ConfigError> {
        if self.is_persistent() {
            Ok(())
        } else {
            Err(ConfigError::EphemeralStore)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageConfig::Memory => "memory",
            StorageConfig::Sqlite { .. } => "sqlite",
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStore(String),
    EphemeralStore,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStore(value) => {
                write!(f, "PROPERTY_STORE must be 'memory' or 'sqlite' (found '{value}')")
            }
            ConfigError::EphemeralStore => write!(
                f,
                "PROPERTY_STORE=memory does not keep data after exit; set PROPERTY_STORE=sqlite"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStore(_)
            | ConfigError::EphemeralStore => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "PORT",
            "APP_LOG_LEVEL",
            "PROPERTY_STORE",
            "DATABASE_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.ansi);
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn falls_back_to_plain_port_variable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORT", "8080");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.server.port, 8080);

        env::set_var("APP_PORT", "9090");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.server.port, 9090);
        reset_env();
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "seventy");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        reset_env();
    }

    #[test]
    fn sqlite_store_uses_database_url_or_default() {
        assert_eq!(
            StorageConfig::from_env(Some("SQLite"), None).expect("sqlite store"),
            StorageConfig::Sqlite {
                url: DEFAULT_DATABASE_URL.to_string()
            }
        );
        assert_eq!(
            StorageConfig::from_env(Some("sqlite"), Some("sqlite::memory:".to_string()))
                .expect("sqlite store"),
            StorageConfig::Sqlite {
                url: "sqlite::memory:".to_string()
            }
        );
    }

    #[test]
    fn only_sqlite_is_persistent() {
        assert!(matches!(
            StorageConfig::Memory.require_persistent(),
            Err(ConfigError::EphemeralStore)
        ));
        let sqlite = StorageConfig::Sqlite {
            url: DEFAULT_DATABASE_URL.to_string(),
        };
        assert!(sqlite.is_persistent());
        assert!(sqlite.require_persistent().is_ok());
    }

    #[test]
    fn unknown_store_is_rejected() {
        match StorageConfig::from_env(Some("postgres"), None) {
            Err(ConfigError::InvalidStore(value)) => assert_eq!(value, "postgres"),
            other => panic!("expected invalid store, got {other:?}"),
        }
    }
}
