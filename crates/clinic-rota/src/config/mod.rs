use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::calendar;
use crate::workflows::roster::SchedulingWindow;

const DEFAULT_WINDOW_START: &str = "2026-01-05";
const DEFAULT_WINDOW_END: &str = "2026-03-27";

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

/// Top-level configuration for the service and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scheduling: SchedulingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scheduling: SchedulingConfig::from_env()?,
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
}

/// Default scheduling window and optional seed file for the store.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub window: SchedulingWindow,
    pub config_path: Option<PathBuf>,
}

impl SchedulingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let start = window_date("ROTA_WINDOW_START", DEFAULT_WINDOW_START)?;
        let end = window_date("ROTA_WINDOW_END", DEFAULT_WINDOW_END)?;
        let window =
            SchedulingWindow::new(start, end).ok_or(ConfigError::InvertedWindow { start, end })?;

        let config_path = env::var("ROTA_CONFIG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            window,
            config_path,
        })
    }
}

fn window_date(var: &'static str, default: &str) -> Result<NaiveDate, ConfigError> {
    let value = env::var(var).unwrap_or_else(|_| default.to_string());
    calendar::parse_iso_date(&value).ok_or(ConfigError::InvalidWindowDate { var, value })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWindowDate { var: &'static str, value: String },
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWindowDate { var, value } => {
                write!(f, "{} must be an ISO date (found {:?})", var, value)
            }
            ConfigError::InvertedWindow { start, end } => write!(
                f,
                "ROTA_WINDOW_START ({}) must not be after ROTA_WINDOW_END ({})",
                start, end
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidWindowDate { .. }
            | ConfigError::InvertedWindow { .. } => None,
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
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ROTA_WINDOW_START",
            "ROTA_WINDOW_END",
            "ROTA_CONFIG_PATH",
        ] {
            env::remove_var(var);
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
        assert_eq!(
            config.scheduling.window.start(),
            NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date")
        );
        assert!(config.scheduling.config_path.is_none());
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
    fn rejects_inverted_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ROTA_WINDOW_START", "2026-04-01");
        env::set_var("ROTA_WINDOW_END", "2026-03-27");
        match AppConfig::load() {
            Err(ConfigError::InvertedWindow { .. }) => {}
            other => panic!("expected inverted window, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_unparseable_window_dates() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ROTA_WINDOW_END", "end of march");
        match AppConfig::load() {
            Err(ConfigError::InvalidWindowDate { var, .. }) => assert_eq!(var, "ROTA_WINDOW_END"),
            other => panic!("expected invalid window date, got {other:?}"),
        }
        reset_env();
    }
}
