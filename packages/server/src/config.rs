use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::insights::FailurePolicy;
use crate::kernel::RetryPolicy;

/// Default model used for insight generation
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Every Sunday at midnight (sec min hour day-of-month month day-of-week)
pub const DEFAULT_INSIGHTS_SCHEDULE: &str = "0 0 0 * * SUN";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
    pub insights_schedule: String,
    pub run_on_startup: bool,
    pub failure_policy: FailurePolicy,
    pub retry_policy: RetryPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_retries: u32 = lookup("INSIGHTS_MAX_RETRIES")
            .unwrap_or_else(|| "3".to_string())
            .parse()
            .context("INSIGHTS_MAX_RETRIES must be a valid number")?;
        let retry_delay_ms: u64 = lookup("INSIGHTS_RETRY_DELAY_MS")
            .unwrap_or_else(|| "1000".to_string())
            .parse()
            .context("INSIGHTS_RETRY_DELAY_MS must be a valid number")?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            gemini_api_key: lookup("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            gemini_model: lookup("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL"),
            insights_schedule: lookup("INSIGHTS_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_INSIGHTS_SCHEDULE.to_string()),
            run_on_startup: parse_bool(lookup("INSIGHTS_RUN_ON_STARTUP").as_deref())
                .context("INSIGHTS_RUN_ON_STARTUP must be true or false")?,
            failure_policy: lookup("INSIGHTS_FAILURE_POLICY")
                .as_deref()
                .unwrap_or("abort")
                .parse()
                .context("INSIGHTS_FAILURE_POLICY must be 'abort' or 'continue'")?,
            retry_policy: RetryPolicy::new(max_retries, Duration::from_millis(retry_delay_ms)),
        })
    }
}

fn parse_bool(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => bail!("invalid boolean: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/insights"),
            ("GEMINI_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.insights_schedule, DEFAULT_INSIGHTS_SCHEDULE);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.failure_policy, FailurePolicy::AbortBatch);
        assert_eq!(config.retry_policy.max_retries, 3);
        assert_eq!(config.retry_policy.base_delay, Duration::from_millis(1000));
        assert!(!config.run_on_startup);
        assert!(config.gemini_base_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/insights"),
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("INSIGHTS_SCHEDULE", "0 30 2 * * *"),
            ("INSIGHTS_RUN_ON_STARTUP", "true"),
            ("INSIGHTS_FAILURE_POLICY", "continue"),
            ("INSIGHTS_MAX_RETRIES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.insights_schedule, "0 30 2 * * *");
        assert!(config.run_on_startup);
        assert_eq!(config.failure_policy, FailurePolicy::ContinueOnError);
        assert_eq!(config.retry_policy.max_retries, 0);
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/insights",
        )]))
        .unwrap_err();

        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_invalid_failure_policy() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/insights"),
            ("GEMINI_API_KEY", "key"),
            ("INSIGHTS_FAILURE_POLICY", "sometimes"),
        ]));

        assert!(result.is_err());
    }
}
