use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::aggregate::DEFAULT_TOP_N;

/// File read when nothing else is configured.
pub const DEFAULT_SOURCE: &str = "country_wise_latest_covid.csv";

/// Environment variable overriding the source path.
pub const ENV_SOURCE: &str = "COVID_DASH_DATA";
/// Environment variable overriding the ranking length.
pub const ENV_TOP_N: &str = "COVID_DASH_TOP_N";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Settings shared by the dashboard and the report binary.
///
/// Resolution order: defaults, then environment, then the first CLI argument
/// (source path only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub source: PathBuf,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (the environment, or a map in tests).
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(source) = lookup(ENV_SOURCE).filter(|s| !s.trim().is_empty()) {
            self.source = PathBuf::from(source);
        }
        if let Some(raw) = lookup(ENV_TOP_N) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.top_n = n,
                Err(_) => log::warn!("ignoring {ENV_TOP_N}={raw:?}: not a non-negative integer"),
            }
        }
        self
    }

    /// A positional source argument wins over everything else.
    pub fn with_source_arg(mut self, arg: Option<String>) -> Self {
        if let Some(source) = arg {
            self.source = PathBuf::from(source);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.source, PathBuf::from(DEFAULT_SOURCE));
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn environment_then_argument() {
        let cfg = DashboardConfig::default()
            .with_lookup(lookup(&[(ENV_SOURCE, "env.csv"), (ENV_TOP_N, "5")]));
        assert_eq!(cfg.source, PathBuf::from("env.csv"));
        assert_eq!(cfg.top_n, 5);

        let cfg = cfg.with_source_arg(Some("arg.csv".into()));
        assert_eq!(cfg.source, PathBuf::from("arg.csv"));
    }

    #[test]
    fn bad_top_n_is_ignored() {
        let cfg = DashboardConfig::default().with_lookup(lookup(&[(ENV_TOP_N, "many")]));
        assert_eq!(cfg.top_n, DEFAULT_TOP_N);
    }
}
