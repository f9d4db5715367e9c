use std::time::Duration;

use chrono::NaiveDate;
use workplan_pipeline::ImportSettings;

/// Invalid or missing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub rtu_api_url: String,
    pub rtu_username: String,
    pub rtu_password: String,
    pub spatial_api_url: String,
    /// Time between scheduled runs. Zero means a single blocking run.
    pub interval: Duration,
    /// Whether scheduled runs await their stages.
    pub blocking: bool,
    pub http_timeout: Duration,
    pub json_logs: bool,
    pub import: ImportSettings,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Default      |
    /// |----------------------------|--------------|
    /// | `DATABASE_URL`             | required     |
    /// | `RTU_API_URL`              | required     |
    /// | `RTU_USERNAME`             | required     |
    /// | `RTU_PASSWORD`             | required     |
    /// | `SPATIAL_API_URL`          | required     |
    /// | `RTU_IMPORT_BATCH_SIZE`    | `10`         |
    /// | `RTU_SESSION_MAX_RETRIES`  | `3`          |
    /// | `RTU_IMPORT_DATE_FROM`     | `2016-01-01` |
    /// | `RTU_IMPORT_INTERVAL_SECS` | `86400`      |
    /// | `RTU_IMPORT_BLOCKING`      | `false`      |
    /// | `SPATIAL_BOROUGH_LAYER_ID` | `borough`    |
    /// | `SPATIAL_CITY_LAYER_ID`    | `city`       |
    /// | `HTTP_TIMEOUT_SECS`        | `60`         |
    /// | `LOG_FORMAT`               | `pretty`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let defaults = ImportSettings::default();

        let batch_size: usize = parse(&lookup, "RTU_IMPORT_BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                name: "RTU_IMPORT_BATCH_SIZE",
                reason: "must be greater than zero".to_string(),
            });
        }

        let date_from = match lookup("RTU_IMPORT_DATE_FROM") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                ConfigError::Invalid {
                    name: "RTU_IMPORT_DATE_FROM",
                    reason: e.to_string(),
                }
            })?,
            None => defaults.date_from,
        };

        let import = ImportSettings {
            batch_size,
            max_session_retries: parse(&lookup, "RTU_SESSION_MAX_RETRIES", defaults.max_session_retries)?,
            date_from,
            borough_layer_id: lookup("SPATIAL_BOROUGH_LAYER_ID").unwrap_or(defaults.borough_layer_id),
            city_layer_id: lookup("SPATIAL_CITY_LAYER_ID").unwrap_or(defaults.city_layer_id),
            ..defaults
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            rtu_api_url: required("RTU_API_URL")?,
            rtu_username: required("RTU_USERNAME")?,
            rtu_password: required("RTU_PASSWORD")?,
            spatial_api_url: required("SPATIAL_API_URL")?,
            interval: Duration::from_secs(parse(&lookup, "RTU_IMPORT_INTERVAL_SECS", 86_400u64)?),
            blocking: parse(&lookup, "RTU_IMPORT_BLOCKING", false)?,
            http_timeout: Duration::from_secs(parse(&lookup, "HTTP_TIMEOUT_SECS", 60u64)?),
            json_logs: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            import,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
