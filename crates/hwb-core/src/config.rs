use std::{env, fs, path::Path, time::Duration};

use crate::{domain::ChatId, errors::Error, Result};

const DEFAULT_POLL_PERIOD_SECS: u64 = 600;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Typed configuration for the watcher.
///
/// Loaded once at startup and passed into the poller; there are no mutable
/// process-wide settings.
#[derive(Clone, Debug)]
pub struct Config {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: ChatId,

    /// Sleep between poll cycles.
    pub poll_period: Duration,
    /// Per-request timeout for the status API.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment (and an optional `.env` file).
    ///
    /// All three credentials must be present and non-empty; every missing one
    /// is logged before the load fails so the operator sees the full list.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        tracing::info!("checking required environment variables");

        let practicum_token = env_str("PRACTICUM_TOKEN").unwrap_or_default();
        let telegram_token = env_str("TELEGRAM_TOKEN").unwrap_or_default();
        let chat_id_raw = env_str("TELEGRAM_CHAT_ID").unwrap_or_default();

        let missing = missing_keys(&practicum_token, &telegram_token, &chat_id_raw);
        if !missing.is_empty() {
            for key in &missing {
                tracing::error!("required environment variable {key} is not set");
            }
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let telegram_chat_id = chat_id_raw
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| {
                Error::Config(format!(
                    "TELEGRAM_CHAT_ID is not a numeric chat id: {chat_id_raw}"
                ))
            })?;

        let poll_period =
            Duration::from_secs(env_u64("POLL_PERIOD_SECS").unwrap_or(DEFAULT_POLL_PERIOD_SECS));
        let request_timeout = Duration::from_secs(
            env_u64("REQUEST_TIMEOUT_SECS").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            poll_period,
            request_timeout,
        })
    }
}

/// Names of the required variables that are absent or blank.
fn missing_keys(
    practicum_token: &str,
    telegram_token: &str,
    telegram_chat_id: &str,
) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if practicum_token.trim().is_empty() {
        missing.push("PRACTICUM_TOKEN");
    }
    if telegram_token.trim().is_empty() {
        missing.push("TELEGRAM_TOKEN");
    }
    if telegram_chat_id.trim().is_empty() {
        missing.push("TELEGRAM_CHAT_ID");
    }
    missing
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_names_every_absent_variable() {
        assert_eq!(
            missing_keys("", "", ""),
            vec!["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"]
        );
        assert_eq!(missing_keys("t", "t", "42"), Vec::<&str>::new());
    }

    #[test]
    fn blank_values_count_as_missing() {
        assert_eq!(missing_keys("  ", "t", "42"), vec!["PRACTICUM_TOKEN"]);
        assert_eq!(missing_keys("t", "\t", "42"), vec!["TELEGRAM_TOKEN"]);
        assert_eq!(missing_keys("t", "t", " "), vec!["TELEGRAM_CHAT_ID"]);
    }
}
