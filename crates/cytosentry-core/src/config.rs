use crate::bayes::DEFAULT_COVERAGE;

pub const SIGNAL_URL_ENV: &str = "CYTOSENTRY_SIGNAL_URL";
pub const SIGNAL_TIMEOUT_MS_ENV: &str = "CYTOSENTRY_SIGNAL_TIMEOUT_MS";
pub const SIGNAL_RATE_BUDGET_ENV: &str = "CYTOSENTRY_SIGNAL_RATE_BUDGET";
pub const SIGNAL_CACHE_TTL_SECS_ENV: &str = "CYTOSENTRY_SIGNAL_CACHE_TTL_SECS";
pub const CREDIBLE_COVERAGE_ENV: &str = "CYTOSENTRY_CREDIBLE_COVERAGE";

const DEFAULT_SIGNAL_URL: &str = "https://api.fda.gov/drug/event.json";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_RATE_BUDGET: u32 = 40;
const DEFAULT_CACHE_TTL_SECS: i64 = 3_600;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Shared outbound budget: requests per rolling 60-second window across
    /// every concurrent caller in the deployment unit.
    pub rate_budget_per_minute: u32,
    pub cache_ttl_secs: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub signal: SignalConfig,
    pub credible_coverage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            signal: SignalConfig {
                base_url: DEFAULT_SIGNAL_URL.to_string(),
                timeout_ms: DEFAULT_TIMEOUT_MS,
                rate_budget_per_minute: DEFAULT_RATE_BUDGET,
                cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            },
            credible_coverage: DEFAULT_COVERAGE,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            signal: SignalConfig {
                base_url: read_non_empty_env(SIGNAL_URL_ENV)
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.signal.base_url),
                timeout_ms: read_env_u64(SIGNAL_TIMEOUT_MS_ENV)
                    .unwrap_or(defaults.signal.timeout_ms),
                rate_budget_per_minute: read_env_u32(SIGNAL_RATE_BUDGET_ENV)
                    .filter(|budget| *budget > 0)
                    .unwrap_or(defaults.signal.rate_budget_per_minute),
                cache_ttl_secs: read_env_i64(SIGNAL_CACHE_TTL_SECS_ENV)
                    .filter(|ttl| *ttl > 0)
                    .unwrap_or(defaults.signal.cache_ttl_secs),
            },
            credible_coverage: read_env_f64(CREDIBLE_COVERAGE_ENV)
                .filter(|coverage| *coverage > 0.0 && *coverage < 1.0)
                .unwrap_or(defaults.credible_coverage),
        }
    }
}

#[must_use]
fn read_non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
fn read_env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
}

#[must_use]
fn read_env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
}

#[must_use]
fn read_env_i64(name: &str) -> Option<i64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
}

#[must_use]
fn read_env_f64(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert!(config.signal.rate_budget_per_minute > 0);
        assert!(config.signal.cache_ttl_secs > 0);
        assert!(config.credible_coverage > 0.0 && config.credible_coverage < 1.0);
        assert!(!config.signal.base_url.ends_with('/'));
    }
}
