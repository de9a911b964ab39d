//! Shared helper functions for CLI commands

use miette::Result;

use crate::core::{Config, Credentials};
use crate::notion::{NotionClient, RetryPolicy};

use super::GlobalOpts;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Load the layered configuration honouring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Ok(Config::load(global.config.as_deref())?)
}

/// Credentials plus a ready HTTP client
pub fn connect(config: &Config) -> Result<(Credentials, NotionClient)> {
    let credentials = config.credentials()?;
    let client = NotionClient::new(&credentials, config)?;
    Ok((credentials, client))
}

/// Retry policy from the configured attempts and delay
pub fn retry_policy(config: &Config) -> RetryPolicy {
    RetryPolicy::new(config.max_retries(), config.delay())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_str("this is too long", 10), "this is...");
        assert_eq!(truncate_str("Société Générale", 8), "Socié...");
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = Config {
            delay_secs: Some(0.5),
            max_retries: Some(4),
            ..Default::default()
        };

        let policy = retry_policy(&config);

        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.base_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_connect_requires_credentials() {
        assert!(connect(&Config::default()).is_err());
    }
}
