//! Transport configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;
const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
    pub proxy_url: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout_secs: DEFAULT_POOL_IDLE_TIMEOUT_SECS,
            proxy_url: None,
            user_agent: None,
        }
    }
}

impl TransportConfig {
    /// Reads `HTTP_PLUGINS_*` variables; unset or unparsable values keep their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            timeout_secs: parsed(&lookup, "HTTP_PLUGINS_TIMEOUT_SECS")
                .unwrap_or(defaults.timeout_secs),
            pool_max_idle_per_host: parsed(&lookup, "HTTP_PLUGINS_POOL_MAX_IDLE_PER_HOST")
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout_secs: parsed(&lookup, "HTTP_PLUGINS_POOL_IDLE_TIMEOUT_SECS")
                .unwrap_or(defaults.pool_idle_timeout_secs),
            proxy_url: lookup("HTTP_PLUGINS_PROXY_URL").filter(|s| !s.trim().is_empty()),
            user_agent: lookup("HTTP_PLUGINS_USER_AGENT").filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw)
            .map_err(|e| Error::configuration(format!("invalid transport config: {e}")))
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_and_fallbacks() {
        let cfg = TransportConfig::from_lookup(lookup(&[
            ("HTTP_PLUGINS_TIMEOUT_SECS", " 5 "),
            ("HTTP_PLUGINS_POOL_MAX_IDLE_PER_HOST", "lots"),
            ("HTTP_PLUGINS_PROXY_URL", ""),
            ("HTTP_PLUGINS_USER_AGENT", "probe/1.0"),
        ]));
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.pool_max_idle_per_host, DEFAULT_POOL_MAX_IDLE_PER_HOST);
        assert_eq!(cfg.pool_idle_timeout_secs, DEFAULT_POOL_IDLE_TIMEOUT_SECS);
        assert_eq!(cfg.proxy_url, None);
        assert_eq!(cfg.user_agent.as_deref(), Some("probe/1.0"));
    }

    #[test]
    fn yaml_fills_missing_fields() {
        let cfg = TransportConfig::from_yaml_str("timeout_secs: 12\nproxy_url: http://proxy:3128\n")
            .unwrap();
        assert_eq!(cfg.timeout_secs, 12);
        assert_eq!(cfg.proxy_url.as_deref(), Some("http://proxy:3128"));
        assert_eq!(cfg.pool_idle_timeout_secs, DEFAULT_POOL_IDLE_TIMEOUT_SECS);
    }

    #[test]
    fn yaml_rejects_wrong_types() {
        let err = TransportConfig::from_yaml_str("timeout_secs: soon").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
