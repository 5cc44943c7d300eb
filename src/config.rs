use std::path::PathBuf;
use std::time::Duration;

use crate::notifications::SmtpSettings;
use crate::store::TransitionPolicy;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read from the process environment, after loading a `.env` file when one
// is present. Mail goes through SMTP when host, user and password are all
// set, or into a spool directory when MAIL_SPOOL_DIR is set. With neither,
// notifications are skipped.
//
// ============================================================================

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ORDERS_FILE: &str = "orders.json";
const DEFAULT_MAIL_FROM: &str = "no-reply@importpro.fr";
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_METRICS_PORT: u16 = 9090;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub orders_file: String,
    pub mail_from: String,
    pub mail_spool_dir: Option<PathBuf>,
    pub smtp: SmtpSettings,
    pub mail_send_timeout: Duration,
    pub metrics_port: u16,
    pub transition_policy: TransitionPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            orders_file: DEFAULT_ORDERS_FILE.to_string(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            mail_spool_dir: None,
            smtp: SmtpSettings::default(),
            mail_send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
            metrics_port: DEFAULT_METRICS_PORT,
            transition_policy: TransitionPolicy::default(),
        }
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
        value,
    })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("STOREFRONT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = get("STOREFRONT_ORDERS_FILE") {
            config.orders_file = file;
        }
        if let Some(from) = get("MAIL_FROM") {
            config.mail_from = from;
        }
        config.mail_spool_dir = get("MAIL_SPOOL_DIR").map(PathBuf::from);
        config.smtp.host = get("SMTP_HOST");
        config.smtp.user = get("SMTP_USER");
        config.smtp.pass = get("SMTP_PASS");
        if let Some(port) = get("SMTP_PORT") {
            config.smtp.port = parse("SMTP_PORT", port)?;
        }
        if let Some(secs) = get("MAIL_SEND_TIMEOUT_SECS") {
            config.mail_send_timeout = Duration::from_secs(parse("MAIL_SEND_TIMEOUT_SECS", secs)?);
        }
        if let Some(port) = get("METRICS_PORT") {
            config.metrics_port = parse("METRICS_PORT", port)?;
        }
        if let Some(policy) = get("ORDER_TRANSITIONS") {
            config.transition_policy = parse("ORDER_TRANSITIONS", policy)?;
        }

        Ok(config)
    }
}
