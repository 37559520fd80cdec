//! Navdata client configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NavdataConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for NavdataConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl NavdataConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            base_url: lookup("FMS_NAVDATA_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| "http://localhost:5000".to_string()),
            request_timeout: Duration::from_secs(number("FMS_NAVDATA_TIMEOUT_S", 10)),
            cache_ttl: Duration::from_secs(number("FMS_NAVDATA_CACHE_TTL_S", 300)),
            cache_max_entries: number("FMS_NAVDATA_CACHE_MAX_ENTRIES", 256) as usize,
            backoff_base: Duration::from_millis(number("FMS_NAVDATA_BACKOFF_BASE_MS", 500)),
            backoff_max: Duration::from_millis(number("FMS_NAVDATA_BACKOFF_MAX_MS", 30_000)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> NavdataConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NavdataConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = NavdataConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.cache_max_entries, 256);
        assert_eq!(config.backoff_base, Duration::from_millis(500));
        assert_eq!(config.backoff_max, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = config_from(&[
            ("FMS_NAVDATA_URL", "http://navdata.local:8080/"),
            ("FMS_NAVDATA_CACHE_TTL_S", "60"),
            ("FMS_NAVDATA_CACHE_MAX_ENTRIES", "lots"),
        ]);
        assert_eq!(config.base_url, "http://navdata.local:8080");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_max_entries, 256);
    }
}
