//! Configuration Module
//!
//! Memoization options that can be loaded from environment variables.

use std::env;
use std::time::Duration;

/// Environment variable holding the default max age in milliseconds.
pub const MAX_AGE_ENV: &str = "MEMO_MAX_AGE_MS";

/// Options shared by every wrapper built with them.
///
/// The default never expires entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoOptions {
    /// How long a computed result stays valid, None = never expires
    pub max_age: Option<Duration>,
}

impl MemoOptions {
    /// Creates options with a max age in milliseconds.
    pub fn with_max_age_ms(ms: u64) -> Self {
        Self {
            max_age: Some(Duration::from_millis(ms)),
        }
    }

    /// Creates options by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_MAX_AGE_MS` - Max age in milliseconds (default: never expire)
    pub fn from_env() -> Self {
        Self {
            max_age: env::var(MAX_AGE_ENV)
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = MemoOptions::default();
        assert!(options.max_age.is_none());
    }

    #[test]
    fn test_options_with_max_age_ms() {
        let options = MemoOptions::with_max_age_ms(250);
        assert_eq!(options.max_age, Some(Duration::from_millis(250)));
    }

    // Single test touches the env var to avoid races between parallel tests
    #[test]
    fn test_options_from_env() {
        env::remove_var(MAX_AGE_ENV);
        assert!(MemoOptions::from_env().max_age.is_none());

        env::set_var(MAX_AGE_ENV, "1500");
        assert_eq!(
            MemoOptions::from_env().max_age,
            Some(Duration::from_millis(1500))
        );

        env::set_var(MAX_AGE_ENV, "soon");
        assert!(MemoOptions::from_env().max_age.is_none());

        env::remove_var(MAX_AGE_ENV);
    }
}
