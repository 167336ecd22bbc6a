// src/config.rs

use std::env;

use crate::models::ActionKind;

#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub limit: i64,
    pub window_secs: i64,
}

/// Runtime knobs, read once at startup. Defaults match the governance
/// policy the service shipped with; override via environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub generate_limit: RateLimit,
    pub validate_limit: RateLimit,
    pub fix_limit: RateLimit,
    pub daily_cost_limit: f64,
    pub monthly_cost_limit: f64,
    /// Fraction of a cost ceiling that triggers a warning.
    pub warning_fraction: f64,
    pub cache_ttl_hours: i64,
    pub cost_per_1k_tokens: f64,
    pub oracle_url: Option<String>,
    pub oracle_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generate_limit: RateLimit { limit: 10, window_secs: 3600 },
            validate_limit: RateLimit { limit: 20, window_secs: 3600 },
            fix_limit: RateLimit { limit: 5, window_secs: 3600 },
            daily_cost_limit: 10.0,
            monthly_cost_limit: 100.0,
            warning_fraction: 0.8,
            cache_ttl_hours: 24,
            cost_per_1k_tokens: 0.002,
            oracle_url: None,
            oracle_timeout_secs: 30,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            generate_limit: RateLimit {
                limit: env_parse("GENERATE_RATE_LIMIT", defaults.generate_limit.limit),
                window_secs: defaults.generate_limit.window_secs,
            },
            validate_limit: RateLimit {
                limit: env_parse("VALIDATE_RATE_LIMIT", defaults.validate_limit.limit),
                window_secs: defaults.validate_limit.window_secs,
            },
            fix_limit: RateLimit {
                limit: env_parse("FIX_RATE_LIMIT", defaults.fix_limit.limit),
                window_secs: defaults.fix_limit.window_secs,
            },
            daily_cost_limit: env_parse("DAILY_COST_LIMIT", defaults.daily_cost_limit),
            monthly_cost_limit: env_parse("MONTHLY_COST_LIMIT", defaults.monthly_cost_limit),
            warning_fraction: env_parse("COST_WARNING_FRACTION", defaults.warning_fraction),
            cache_ttl_hours: env_parse("CACHE_TTL_HOURS", defaults.cache_ttl_hours),
            cost_per_1k_tokens: env_parse("COST_PER_1K_TOKENS", defaults.cost_per_1k_tokens),
            oracle_url: env::var("ORACLE_URL").ok().filter(|s| !s.is_empty()),
            oracle_timeout_secs: env_parse("ORACLE_TIMEOUT_SECS", defaults.oracle_timeout_secs),
        }
    }

    pub fn rate_limit(&self, action: ActionKind) -> RateLimit {
        match action {
            ActionKind::Generate => self.generate_limit,
            ActionKind::Validate => self.validate_limit,
            ActionKind::Fix => self.fix_limit,
        }
    }
}
