use std::str::FromStr;

use anyhow::{Context, Result};
use risk_manager::CategoryWeights;

/// Server settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub lttb_threshold: usize,
    pub db_max_connections: u32,
    pub initial_weights: CategoryWeights,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:oilrisk.db".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            lttb_threshold: timeseries::DEFAULT_LTTB_THRESHOLD,
            db_max_connections: 5,
            initial_weights: CategoryWeights::default(),
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables
    /// take their defaults; unparsable ones are errors naming the variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let initial_weights = CategoryWeights {
            supply_demand: parse_or(&get, "WEIGHT_SUPPLY_DEMAND", defaults.initial_weights.supply_demand)?,
            macroeconomic: parse_or(&get, "WEIGHT_MACRO", defaults.initial_weights.macroeconomic)?,
            financial: parse_or(&get, "WEIGHT_FINANCIAL", defaults.initial_weights.financial)?,
            geopolitical: parse_or(&get, "WEIGHT_GEOPOLITICAL", defaults.initial_weights.geopolitical)?,
            sentiment: parse_or(&get, "WEIGHT_SENTIMENT", defaults.initial_weights.sentiment)?,
        };
        initial_weights
            .validate()
            .context("Invalid initial category weights")?;

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            lttb_threshold: parse_or(&get, "LTTB_THRESHOLD", defaults.lttb_threshold)?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            initial_weights,
            cors_origins: get("CORS_ORIGINS").map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
