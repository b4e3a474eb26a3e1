use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::ranking::DEFAULT_LIMIT;

/// Runtime settings.
///
/// Precedence (lowest to highest): defaults → env vars. Embedders that keep
/// settings in a file can deserialize a `Config` directly; missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory for durable slots. `None` keeps everything in memory.
    pub storage_dir: Option<PathBuf>,

    /// Artificial delay before admin operations complete.
    pub latency_ms: u64,

    /// How many matches the trending and top-rated views show.
    pub sidebar_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            latency_ms: 300,
            sidebar_limit: DEFAULT_LIMIT,
        }
    }
}

impl Config {
    /// Defaults overlaid with `MATCHDAY_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_vars(std::env::vars());
        config
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    fn apply_vars<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let applied = match name.as_str() {
                "MATCHDAY_STORAGE_DIR" => {
                    self.storage_dir = Some(value.trim())
                        .filter(|v| !v.is_empty())
                        .map(PathBuf::from);
                    Ok(())
                }
                "MATCHDAY_LATENCY_MS" => value.trim().parse::<u64>().map(|ms| self.latency_ms = ms),
                "MATCHDAY_SIDEBAR_LIMIT" => {
                    value.trim().parse::<usize>().map(|limit| self.sidebar_limit = limit)
                }
                _ => Ok(()),
            };
            if let Err(err) = applied {
                warn!(setting = %name, value = %value, error = %err, "ignoring malformed setting");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut config = Config::default();
        config.apply_vars(vars(&[
            ("MATCHDAY_STORAGE_DIR", "/tmp/matchday"),
            ("MATCHDAY_LATENCY_MS", " 0 "),
            ("MATCHDAY_SIDEBAR_LIMIT", "5"),
            ("PATH", "/usr/bin"),
        ]));

        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/matchday")));
        assert_eq!(config.latency(), Duration::ZERO);
        assert_eq!(config.sidebar_limit, 5);
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let mut config = Config::default();
        config.apply_vars(vars(&[
            ("MATCHDAY_LATENCY_MS", "soon"),
            ("MATCHDAY_SIDEBAR_LIMIT", "-1"),
            ("MATCHDAY_STORAGE_DIR", "  "),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_json_config() {
        let config: Config = serde_json::from_str(r#"{"latencyMs": 25}"#).unwrap();
        assert_eq!(config.latency_ms, 25);
        assert_eq!(config.sidebar_limit, DEFAULT_LIMIT);
        assert_eq!(config.storage_dir, None);
    }
}
