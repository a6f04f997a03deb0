use crate::{
    config::{ReviewConfig, ReviewConfigError, ReviewConfigResult},
    defaults,
};
use serde::{Deserialize, Serialize};
use std::{env, future::Future, str::FromStr};
use tokio::time::{sleep, Duration};
use tracing::warn;
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

fn is_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Trim the leading '$' or '${' and trailing '}' from an environment variable.
pub fn trim_opt_env_key(key: &str) -> ReviewConfigResult<&str> {
    // Bare key: $FOO, braced key: ${FOO}
    let name = match key.strip_prefix("${") {
        Some(rest) => rest.strip_suffix('}'),
        None => key.strip_prefix('$'),
    };

    name.filter(|name| is_env_var_name(name))
        .ok_or_else(|| ReviewConfigError::InvalidEnvVarKey(key.to_string()))
}

/// Determine whether a given value refers to an environment variable.
///
/// `${...}` always does. A bare `$` only does when a variable name follows it,
/// so values such as `$3cret!` stay literal.
pub fn is_opt_env_var(k: &str) -> bool {
    k.starts_with("${") || k.strip_prefix('$').map_or(false, is_env_var_name)
}

/// Attempt to connect to a database, with retries.
///
/// This function takes a closure with a database connection
/// function as an argument; said function should return a future that
/// resolves to a final value of type `Result<T, sqlx::Error>`.
///
/// The last error is returned once the retry budget is spent.
pub async fn attempt_database_connection<F, Fut, T, U>(mut fut: F) -> Result<T, U>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, U>>,
    U: std::error::Error,
{
    let mut remaining_retries = defaults::MAX_DATABASE_CONNECTION_ATTEMPTS;
    let mut delay = defaults::INITIAL_RETRY_DELAY_SECS;
    loop {
        match fut().await {
            Ok(t) => break Ok(t),
            Err(e) => {
                if remaining_retries > 0 {
                    warn!(
                        "Could not connect to database: {e}. Retrying in {delay} seconds...",
                    );
                    remaining_retries -= 1;
                    sleep(Duration::from_secs(delay)).await;
                    delay *= 2;
                } else {
                    break Err(e);
                }
            }
        }
    }
}

/// Denotes the status of a service for the service health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    /// The service is healthy.
    OK,

    /// The service is not healthy.
    NotOk,
}

/// Initialize the logging context for the Gastro Review tooling.
pub fn init_logging(config: &ReviewConfig) -> anyhow::Result<()> {
    let level = env::var(RUST_LOG).unwrap_or_else(|_| config.log_level.clone());

    // We manually suppress the per-statement sqlx logging unless asked for it.
    let directives = if config.verbose {
        level
    } else {
        format!("{level},sqlx=warn")
    };

    let filter = EnvFilter::try_new(directives)?;

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(s) => bool::from_str(&s).map_err(|_| {
            anyhow::anyhow!(
                "Expected `true` or `false` to be provided for `{HUMAN_LOGGING}`."
            )
        })?,
        Err(_) => true,
    };

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_env_var_keys_are_detected_and_trimmed() {
        assert!(is_opt_env_var("$POSTGRES_USER"));
        assert!(is_opt_env_var("${POSTGRES_USER}"));
        assert!(!is_opt_env_var("postgres"));
        assert!(!is_opt_env_var("$3cret!pass"));
        assert!(!is_opt_env_var("$"));

        assert_eq!(trim_opt_env_key("$POSTGRES_USER").unwrap(), "POSTGRES_USER");
        assert_eq!(trim_opt_env_key("${POSTGRES_USER}").unwrap(), "POSTGRES_USER");
    }

    #[test]
    fn test_malformed_env_var_keys_are_errors() {
        for key in ["${", "${}", "${POSTGRES_USER", "${BAD-NAME}", "$"] {
            assert!(
                matches!(trim_opt_env_key(key), Err(ReviewConfigError::InvalidEnvVarKey(k)) if k == key),
                "{key} should be rejected"
            );
        }
        assert!(is_opt_env_var("${"));
    }

    #[tokio::test]
    async fn test_attempt_database_connection_returns_first_success() {
        let mut calls = 0;
        let result = attempt_database_connection(|| {
            calls += 1;
            async { Ok::<u8, std::fmt::Error>(7) }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 1);
    }
}
