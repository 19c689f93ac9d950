use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::lending::UnderwritingConfig;

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

/// Top-level configuration for the lending service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub lending: LendingConfig,
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

        let defaults = UnderwritingConfig::default();
        let default_interest_rate = match env::var("APP_DEFAULT_INTEREST_RATE") {
            Ok(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|rate| *rate >= 0.0)
                .ok_or(ConfigError::InvalidInterestRate)?,
            Err(_) => defaults.default_interest_rate,
        };
        let npa_grace_days = match env::var("APP_NPA_GRACE_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or(ConfigError::InvalidGraceDays)?,
            Err(_) => defaults.npa_grace_days,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            lending: LendingConfig {
                default_interest_rate,
                npa_grace_days,
            },
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

/// Underwriting knobs an operator can override per deployment.
#[derive(Debug, Clone)]
pub struct LendingConfig {
    /// Annual rate in percent for applications that omit one.
    pub default_interest_rate: f64,
    /// Days an installment may run overdue before the NPA sweep flags the loan.
    pub npa_grace_days: i64,
}

impl LendingConfig {
    /// Underwriting constants with the deployment overrides applied.
    pub fn underwriting(&self) -> UnderwritingConfig {
        UnderwritingConfig {
            default_interest_rate: self.default_interest_rate,
            npa_grace_days: self.npa_grace_days,
            ..UnderwritingConfig::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidInterestRate,
    InvalidGraceDays,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidInterestRate => {
                write!(f, "APP_DEFAULT_INTEREST_RATE must be a non-negative number")
            }
            ConfigError::InvalidGraceDays => {
                write!(f, "APP_NPA_GRACE_DAYS must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_DEFAULT_INTEREST_RATE");
        env::remove_var("APP_NPA_GRACE_DAYS");
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
        assert_eq!(config.lending.default_interest_rate, 7.0);
        assert_eq!(config.lending.npa_grace_days, 90);
    }

    #[test]
    fn lending_overrides_reach_the_underwriting_constants() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DEFAULT_INTEREST_RATE", "9.5");
        env::set_var("APP_NPA_GRACE_DAYS", "60");
        let config = AppConfig::load().expect("config loads");
        let underwriting = config.lending.underwriting();
        assert_eq!(underwriting.default_interest_rate, 9.5);
        assert_eq!(underwriting.npa_grace_days, 60);
        // The remaining constants keep their defaults.
        assert_eq!(underwriting.base_score, 500);
        assert_eq!(underwriting.max_score, 900);
        env::remove_var("APP_DEFAULT_INTEREST_RATE");
        env::remove_var("APP_NPA_GRACE_DAYS");
    }

    #[test]
    fn rejects_negative_interest_rate() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DEFAULT_INTEREST_RATE", "-2.0");
        let result = AppConfig::load();
        assert!(matches!(result, Err(ConfigError::InvalidInterestRate)));
        env::remove_var("APP_DEFAULT_INTEREST_RATE");
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "not-a-port");
        let result = AppConfig::load();
        assert!(matches!(result, Err(ConfigError::InvalidPort)));
        env::remove_var("APP_PORT");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        env::remove_var("APP_HOST");
    }
}
