//! Application configuration loaded from environment variables.

use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use domain::{ForeignUserPolicy, NewUser, ThrottleScope};
use thiserror::Error;

/// A configuration value that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("ADMIN_EMAIL, ADMIN_USERNAME, ADMIN_PHONE and ADMIN_PASSWORD must be set together")]
    PartialAdmin,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected text or json".to_string()),
        }
    }
}

/// A request allowance: `limit` requests per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub limit: NonZeroU32,
    pub period: Duration,
}

impl Rate {
    pub fn new(limit: NonZeroU32, period: Duration) -> Self {
        Self { limit, period }
    }

    fn per_minute(limit: u32) -> Self {
        Self {
            limit: NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN),
            period: Duration::from_secs(60),
        }
    }
}

impl FromStr for Rate {
    type Err = String;

    /// Parses `"<count>/<unit>"`, where the unit is `second`, `minute`,
    /// `hour` or `day`; only its first letter is significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, unit) = s
            .split_once('/')
            .ok_or_else(|| "expected <count>/<unit>".to_string())?;

        let limit = count
            .trim()
            .parse::<NonZeroU32>()
            .map_err(|_| format!("'{}' is not a positive count", count.trim()))?;

        let seconds = match unit.trim().chars().next() {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 60 * 60,
            Some('d') => 24 * 60 * 60,
            _ => return Err(format!("unknown unit '{}'", unit.trim())),
        };

        Ok(Self::new(limit, Duration::from_secs(seconds)))
    }
}

/// One rate per throttle scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleRates {
    pub order_create: Rate,
    pub user_orders: Rate,
    pub admin_order_read: Rate,
    pub admin_order_write: Rate,
    pub admin_delete_order: Rate,
}

impl ThrottleRates {
    pub fn get(&self, scope: ThrottleScope) -> Rate {
        match scope {
            ThrottleScope::OrderCreate => self.order_create,
            ThrottleScope::UserOrders => self.user_orders,
            ThrottleScope::AdminOrderRead => self.admin_order_read,
            ThrottleScope::AdminOrderWrite => self.admin_order_write,
            ThrottleScope::AdminDeleteOrder => self.admin_delete_order,
        }
    }

    fn get_mut(&mut self, scope: ThrottleScope) -> &mut Rate {
        match scope {
            ThrottleScope::OrderCreate => &mut self.order_create,
            ThrottleScope::UserOrders => &mut self.user_orders,
            ThrottleScope::AdminOrderRead => &mut self.admin_order_read,
            ThrottleScope::AdminOrderWrite => &mut self.admin_order_write,
            ThrottleScope::AdminDeleteOrder => &mut self.admin_delete_order,
        }
    }
}

impl Default for ThrottleRates {
    fn default() -> Self {
        Self {
            order_create: Rate::per_minute(10),
            user_orders: Rate::per_minute(60),
            admin_order_read: Rate::per_minute(120),
            admin_order_write: Rate::per_minute(60),
            admin_delete_order: Rate::per_minute(30),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` (default `"0.0.0.0"`) and `PORT` (default `3000`)
/// - `RUST_LOG` tracing filter (default `"info"`), `LOG_FORMAT` `text|json`
/// - `DATABASE_URL`: PostgreSQL when set, in-memory store otherwise
/// - `FOREIGN_USER_POLICY`: `forbid` (default) or `conceal`
/// - `THROTTLE_<SCOPE>`: per-scope rate such as `20/minute`
/// - `ADMIN_EMAIL`, `ADMIN_USERNAME`, `ADMIN_PHONE`, `ADMIN_PASSWORD`:
///   superuser created at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub foreign_user_policy: ForeignUserPolicy,
    pub throttle: ThrottleRates,
    pub admin: Option<NewUser>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = parse("PORT", port)?;
        }
        if let Some(level) = var("RUST_LOG") {
            config.log_level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            config.log_format = parse("LOG_FORMAT", format)?;
        }
        config.database_url = var("DATABASE_URL");
        if let Some(policy) = var("FOREIGN_USER_POLICY") {
            config.foreign_user_policy = parse("FOREIGN_USER_POLICY", policy)?;
        }

        for scope in ThrottleScope::ALL {
            let name = throttle_var(scope);
            if let Some(rate) = var(name) {
                *config.throttle.get_mut(scope) = parse(name, rate)?;
            }
        }

        config.admin = match (
            var("ADMIN_EMAIL"),
            var("ADMIN_USERNAME"),
            var("ADMIN_PHONE"),
            var("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(username), Some(phone_number), Some(password)) => Some(NewUser {
                email,
                username,
                phone_number,
                password,
            }),
            (None, None, None, None) => None,
            _ => return Err(ConfigError::PartialAdmin),
        };

        Ok(config)
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            foreign_user_policy: ForeignUserPolicy::Forbid,
            throttle: ThrottleRates::default(),
            admin: None,
        }
    }
}

fn throttle_var(scope: ThrottleScope) -> &'static str {
    match scope {
        ThrottleScope::OrderCreate => "THROTTLE_ORDER_CREATE",
        ThrottleScope::UserOrders => "THROTTLE_USER_ORDERS",
        ThrottleScope::AdminOrderRead => "THROTTLE_ADMIN_ORDER_READ",
        ThrottleScope::AdminOrderWrite => "THROTTLE_ADMIN_ORDER_WRITE",
        ThrottleScope::AdminDeleteOrder => "THROTTLE_ADMIN_DELETE_ORDER",
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}
