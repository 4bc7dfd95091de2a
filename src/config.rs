//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ```bash
//! export OPENAIR_API_KEY="..."
//! export SESSION_SECRET="at-least-thirty-two-characters-of-secret"
//! ```
//!
//! ## Required Variables
//!
//! - `OPENAIR_API_KEY` - OpenAir application key (`NETSUITE_API_KEY` is accepted as a fallback)
//! - `SESSION_SECRET` - key material for signing the session cookie (min 32 chars)
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `SECURE_COOKIES` - Mark the session cookie `Secure` (default: `false`)
//! - `SESSION_IDLE_MINUTES` - Sessions expire after this long without a request (default: 60)
//! - `BEHIND_PROXY` - Rate limiter trusts `X-Forwarded-For` (default: `false`)
//! - `LOGIN_RATE_LIMIT` - Rate-limit login submissions (default: `true`)
//! - `STATIC_DIR` - Static asset directory (default: `static`)
//! - `OPENAIR_ENDPOINT` - API URL (default: `https://www.openair.com/api.pl`)
//! - `OPENAIR_COMPANY` - Company identifier (default: `BFA`)
//! - `OPENAIR_CLIENT` / `OPENAIR_CLIENT_VERSION` / `OPENAIR_NAMESPACE` - Application identity
//! - `OPENAIR_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `OPENAIR_SINCE` - Task date filter, `YYYY-MM-DD` (default: `2016-01-01`)
//! - `OPENAIR_PROJECT_ID` - Task project filter (default: `313`)
//! - `OPENAIR_READ_LIMIT` - Task read limit (default: 1000)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::domain::openair::{ApplicationIdentity, TaskQuery};

/// Minimum length of `SESSION_SECRET`.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Upper bound of `SESSION_IDLE_MINUTES` (one week).
pub const MAX_SESSION_IDLE_MINUTES: u64 = 7 * 24 * 60;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// Key material for the signed session cookie.
    pub session_secret: String,
    /// Sets the `Secure` attribute on the session cookie. Enable when served over HTTPS.
    pub secure_cookies: bool,
    /// Minutes without a request after which a session expires and is purged.
    pub session_idle_minutes: u64,
    /// When true, rate limiting reads client IP from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub login_rate_limit: bool,
    pub static_dir: String,
    pub openair: OpenAirConfig,
}

/// Settings for the OpenAir accounting service.
#[derive(Debug, Clone)]
pub struct OpenAirConfig {
    pub endpoint: String,
    pub api_key: String,
    pub company: String,
    pub client: String,
    pub client_version: String,
    pub namespace: String,
    pub timeout_secs: u64,
    pub since: NaiveDate,
    pub project_id: String,
    pub read_limit: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let session_secret =
            env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;

        let secure_cookies = env_flag("SECURE_COOKIES", false);
        let session_idle_minutes = env_parse("SESSION_IDLE_MINUTES", 60)?;
        let behind_proxy = env_flag("BEHIND_PROXY", false);
        let login_rate_limit = env_flag("LOGIN_RATE_LIMIT", true);

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());

        let openair = OpenAirConfig::from_env().context("Failed to load OpenAir configuration")?;

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            session_secret,
            secure_cookies,
            session_idle_minutes,
            behind_proxy,
            login_rate_limit,
            static_dir,
            openair,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - `session_secret` is shorter than [`MIN_SESSION_SECRET_LEN`]
    /// - `session_idle_minutes` is zero or longer than a week
    /// - the OpenAir settings are invalid (see [`OpenAirConfig::validate`])
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.session_secret.len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LEN
            );
        }

        if self.session_idle_minutes == 0 || self.session_idle_minutes > MAX_SESSION_IDLE_MINUTES {
            anyhow::bail!(
                "SESSION_IDLE_MINUTES must be between 1 and {}, got {}",
                MAX_SESSION_IDLE_MINUTES,
                self.session_idle_minutes
            );
        }

        self.openair.validate()
    }

    /// Idle timeout of a session.
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes * 60)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Secure cookies: {}", self.secure_cookies);
        tracing::info!("  Session idle timeout: {} min", self.session_idle_minutes);
        tracing::info!("  Login rate limit: {}", self.login_rate_limit);
        self.openair.print_summary();
    }
}

impl OpenAirConfig {
    /// Loads OpenAir settings from environment variables.
    ///
    /// Used on its own by the admin CLI, which has no need for the web settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a numeric/date value is malformed.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAIR_API_KEY")
            .or_else(|_| env::var("NETSUITE_API_KEY"))
            .context("OPENAIR_API_KEY must be set")?;

        let endpoint = env::var("OPENAIR_ENDPOINT")
            .unwrap_or_else(|_| "https://www.openair.com/api.pl".to_string());
        let company = env::var("OPENAIR_COMPANY").unwrap_or_else(|_| "BFA".to_string());
        let client = env::var("OPENAIR_CLIENT").unwrap_or_else(|_| "Tempus Fugit".to_string());
        let client_version =
            env::var("OPENAIR_CLIENT_VERSION").unwrap_or_else(|_| "1.0".to_string());
        let namespace = env::var("OPENAIR_NAMESPACE").unwrap_or_else(|_| "default".to_string());

        let defaults = TaskQuery::default();

        let timeout_secs = env_parse("OPENAIR_TIMEOUT_SECS", 10)?;
        let since = match env::var("OPENAIR_SINCE") {
            Ok(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("OPENAIR_SINCE must be YYYY-MM-DD, got '{}'", raw))?,
            Err(_) => defaults.since,
        };
        let project_id = env::var("OPENAIR_PROJECT_ID").unwrap_or(defaults.project_id);
        let read_limit = env_parse("OPENAIR_READ_LIMIT", defaults.limit)?;

        Ok(Self {
            endpoint,
            api_key,
            company,
            client,
            client_version,
            namespace,
            timeout_secs,
            since,
            project_id,
            read_limit,
        })
    }

    /// Validates the OpenAir settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an http(s) URL, the API key or
    /// company is empty, or a numeric setting is zero.
    pub fn validate(&self) -> Result<()> {
        let url = self.endpoint_url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "OPENAIR_ENDPOINT must use http or https, got '{}'",
                self.endpoint
            );
        }

        if self.api_key.trim().is_empty() {
            anyhow::bail!("OPENAIR_API_KEY must not be empty");
        }

        if self.company.trim().is_empty() {
            anyhow::bail!("OPENAIR_COMPANY must not be empty");
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            anyhow::bail!(
                "OPENAIR_TIMEOUT_SECS must be between 1 and 300, got {}",
                self.timeout_secs
            );
        }

        if self.read_limit == 0 {
            anyhow::bail!("OPENAIR_READ_LIMIT must be greater than 0");
        }

        Ok(())
    }

    /// Parses the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid absolute URL.
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint)
            .with_context(|| format!("OPENAIR_ENDPOINT is not a valid URL: '{}'", self.endpoint))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn application(&self) -> ApplicationIdentity {
        ApplicationIdentity {
            client: self.client.clone(),
            client_version: self.client_version.clone(),
            namespace: self.namespace.clone(),
            api_key: self.api_key.clone(),
        }
    }

    pub fn task_query(&self) -> TaskQuery {
        TaskQuery {
            since: self.since,
            project_id: self.project_id.clone(),
            limit: self.read_limit,
        }
    }

    /// Prints OpenAir settings with the API key masked.
    pub fn print_summary(&self) {
        tracing::info!("  OpenAir endpoint: {}", self.endpoint);
        tracing::info!("  OpenAir API key: {}", mask_secret(&self.api_key));
        tracing::info!("  OpenAir company: {}", self.company);
        tracing::info!(
            "  OpenAir client: {} {} ({})",
            self.client,
            self.client_version,
            self.namespace
        );
        tracing::info!(
            "  Task filter: since {}, project {}, limit {}",
            self.since,
            self.project_id,
            self.read_limit
        );
    }
}

/// Masks a secret for logging, keeping the last four characters of long values.
///
/// - `abcdefghijkl` → `********ijkl`
/// - `short` → `***`
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "***".to_string();
    }

    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
