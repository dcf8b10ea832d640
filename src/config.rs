use crate::stream_core::ReconnectPolicy;
use std::env;
use std::time::Duration;

/// Configuration loaded from environment variables
///
/// Every knob has a default matching the stock backend deployment, so a
/// bare `monitor` run against a local backend works with no `.env` at all.
#[derive(Debug, Clone)]
pub struct Config {
    pub ws_url: String,
    pub api_url: String,
    pub window_secs: i64,
    pub bucket_secs: i64,
    pub reconnect: ReconnectPolicy,
    pub channel_buffer: usize,
    pub feed_capacity: usize,
    pub rust_log: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let ws_url = env::var("ALERT_WS_URL")
            .unwrap_or_else(|_| "ws://127.0.0.1:8000/ws/frontend".to_string());

        if !ws_url.starts_with("ws://") && !ws_url.starts_with("wss://") {
            return Err(ConfigError::InvalidValue(
                "ALERT_WS_URL must start with ws:// or wss://".to_string(),
            ));
        }

        let api_url =
            env::var("ALERT_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "ALERT_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let window_secs = env::var("TIMELINE_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<i64>()
            .unwrap_or(60);

        let bucket_secs = env::var("TIMELINE_BUCKET_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<i64>()
            .unwrap_or(5);

        if bucket_secs <= 0 || window_secs < bucket_secs {
            return Err(ConfigError::InvalidValue(format!(
                "timeline window {}s must cover at least one bucket of {}s",
                window_secs, bucket_secs
            )));
        }

        let delay_secs = env::var("RECONNECT_DELAY_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()
            .unwrap_or(5);

        let max_delay_secs = env::var("RECONNECT_MAX_DELAY_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .unwrap_or(60);

        let policy_str = env::var("RECONNECT_POLICY").unwrap_or_else(|_| "fixed".to_string());
        let reconnect = parse_reconnect_policy(&policy_str, delay_secs, max_delay_secs);

        let channel_buffer = env::var("CHANNEL_BUFFER")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<usize>()
            .unwrap_or(1000);

        let feed_capacity = env::var("FEED_CAPACITY")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<usize>()
            .unwrap_or(1000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            ws_url,
            api_url,
            window_secs,
            bucket_secs,
            reconnect,
            channel_buffer,
            feed_capacity,
            rust_log,
        })
    }
}

/// Select the reconnect policy; unknown values fall back to the observed
/// fixed-delay behavior.
fn parse_reconnect_policy(policy: &str, delay_secs: u64, max_delay_secs: u64) -> ReconnectPolicy {
    match policy.to_lowercase().as_str() {
        "exponential" => ReconnectPolicy::Exponential {
            initial: Duration::from_secs(delay_secs),
            max: Duration::from_secs(max_delay_secs),
        },
        "fixed" => ReconnectPolicy::Fixed {
            delay: Duration::from_secs(delay_secs),
        },
        other => {
            log::warn!("Invalid RECONNECT_POLICY '{}', defaulting to fixed", other);
            ReconnectPolicy::Fixed {
                delay: Duration::from_secs(delay_secs),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_policy() {
        let policy = parse_reconnect_policy("fixed", 5, 60);
        assert_eq!(
            policy,
            ReconnectPolicy::Fixed {
                delay: Duration::from_secs(5)
            }
        );
    }

    #[test]
    fn test_parse_exponential_policy() {
        let policy = parse_reconnect_policy("Exponential", 2, 30);
        assert_eq!(
            policy,
            ReconnectPolicy::Exponential {
                initial: Duration::from_secs(2),
                max: Duration::from_secs(30),
            }
        );
    }

    #[test]
    fn test_unknown_policy_falls_back_to_fixed() {
        let policy = parse_reconnect_policy("linear", 5, 60);
        assert_eq!(
            policy,
            ReconnectPolicy::Fixed {
                delay: Duration::from_secs(5)
            }
        );
    }
}
