use anyhow::{anyhow, bail, Context, Result};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;

use crate::cache::DEFAULT_TTL_SECS;
use crate::db::{StoreConfig, NODES_TABLE};

pub const DEFAULT_NODE_URL: &str = "http://localhost:8081";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Rest,
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(StoreBackend::Rest),
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown STORE_BACKEND '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node_url: String,
    pub backend: StoreBackend,
    pub store_url: Option<String>,
    pub store_api_key: Option<String>,
    pub store_table: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("STORE_BACKEND") {
            Some(v) => v.parse::<StoreBackend>()?,
            None => StoreBackend::Rest,
        };
        let cache_ttl_secs = match get("CACHE_TTL_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("CACHE_TTL_SECS must be a number of seconds, got '{}'", v))?,
            None => DEFAULT_TTL_SECS,
        };

        Ok(Self {
            node_url: get("POKT_NODE_URL").unwrap_or_else(|| DEFAULT_NODE_URL.to_string()),
            backend,
            store_url: get("STORE_URL"),
            store_api_key: get("STORE_API_KEY"),
            store_table: get("STORE_TABLE").unwrap_or_else(|| NODES_TABLE.to_string()),
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            cache_ttl_secs,
        })
    }

    pub fn store_config(&self) -> Result<StoreConfig> {
        let (Some(url), Some(api_key)) = (&self.store_url, &self.store_api_key) else {
            bail!("STORE_URL and STORE_API_KEY must be set for the rest backend");
        };
        Ok(StoreConfig {
            url: url.clone(),
            api_key: api_key.clone(),
            table: self.store_table.clone(),
        })
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set for the postgres backend"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.node_url, DEFAULT_NODE_URL);
        assert_eq!(cfg.backend, StoreBackend::Rest);
        assert_eq!(cfg.store_table, "nodes");
        assert_eq!(cfg.cache_ttl_secs, DEFAULT_TTL_SECS);
        assert!(cfg.redis_url.is_none());
        assert!(cfg.store_config().is_err());
    }

    #[test]
    fn store_config_from_environment() {
        let cfg = config(&[
            ("STORE_URL", "https://project.example.co"),
            ("STORE_API_KEY", "anon-key"),
            ("STORE_TABLE", "pokt_nodes"),
            ("REDIS_URL", ""),
        ])
        .unwrap();
        let store = cfg.store_config().unwrap();
        assert_eq!(store.url, "https://project.example.co");
        assert_eq!(store.api_key, "anon-key");
        assert_eq!(store.table, "pokt_nodes");
        assert!(cfg.redis_url.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("STORE_BACKEND", "sqlite")]).is_err());
        assert!(config(&[("CACHE_TTL_SECS", "soon")]).is_err());
        assert_eq!(config(&[("STORE_BACKEND", "PG")]).unwrap().backend, StoreBackend::Postgres);
    }
}
