//! Store configuration.
//!
//! Read from the environment with [`StoreConfig::from_env`]; command-line
//! flags override individual fields afterwards.

use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NEO4J_URI_ENV: &str = "NEO4J_URI";
pub const NEO4J_USER_ENV: &str = "NEO4J_USER";
pub const NEO4J_PASSWORD_ENV: &str = "NEO4J_PASSWORD";
pub const NEO4J_DATABASE_ENV: &str = "NEO4J_DATABASE";
pub const QUERY_TIMEOUT_ENV: &str = "FASTMATCH_QUERY_TIMEOUT_MS";

pub const DEFAULT_NEO4J_URI: &str = "http://localhost:7474";
pub const DEFAULT_NEO4J_USER: &str = "neo4j";
pub const DEFAULT_NEO4J_DATABASE: &str = "neo4j";
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SEED_TIMEOUT_MS: u64 = 30_000;

/// Port of the Neo4j HTTP API when the configured URI names a Bolt endpoint.
const NEO4J_HTTP_PORT: u16 = 7474;

/// Configuration for the incidence store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Graph database to seed and query; `None` serves from memory
    pub graph: Option<GraphConfig>,
    /// Bound on every graph query and on the startup probe
    pub query_timeout_ms: u64,
    /// Bound on the whole seeding pass
    pub seed_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            graph: None,
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            seed_timeout_ms: DEFAULT_SEED_TIMEOUT_MS,
        }
    }
}

/// Connection settings for Neo4j's HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub database: String,
}

impl GraphConfig {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            uri: DEFAULT_NEO4J_URI.to_string(),
            user: DEFAULT_NEO4J_USER.to_string(),
            password: password.into(),
            database: DEFAULT_NEO4J_DATABASE.to_string(),
        }
    }

    /// Base URL of the HTTP API.
    ///
    /// `bolt://` and `neo4j://` URIs are mapped to the HTTP port of the same
    /// host, so an environment set up for a Bolt driver keeps working.
    pub fn http_base_url(&self) -> Result<String> {
        let uri = self.uri.trim().trim_end_matches('/');
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| StoreError::Config(format!("graph URI `{uri}` has no scheme")))?;
        match scheme.to_ascii_lowercase().as_str() {
            "http" | "https" => Ok(uri.to_string()),
            "bolt" | "bolt+s" | "neo4j" | "neo4j+s" => {
                let host = rest
                    .split(['/', ':'])
                    .next()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| StoreError::Config(format!("graph URI `{uri}` has no host")))?;
                let http = if scheme.ends_with("+s") { "https" } else { "http" };
                Ok(format!("{http}://{host}:{NEO4J_HTTP_PORT}"))
            }
            other => Err(StoreError::Config(format!(
                "unsupported graph URI scheme `{other}` (expected http, https, bolt or neo4j)"
            ))),
        }
    }
}

impl StoreConfig {
    /// Read `NEO4J_*` and `FASTMATCH_QUERY_TIMEOUT_MS` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let graph = get(NEO4J_PASSWORD_ENV).map(|password| GraphConfig {
            uri: get(NEO4J_URI_ENV).unwrap_or_else(|| DEFAULT_NEO4J_URI.to_string()),
            user: get(NEO4J_USER_ENV).unwrap_or_else(|| DEFAULT_NEO4J_USER.to_string()),
            password,
            database: get(NEO4J_DATABASE_ENV)
                .unwrap_or_else(|| DEFAULT_NEO4J_DATABASE.to_string()),
        });

        let query_timeout_ms = match get(QUERY_TIMEOUT_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                StoreError::Config(format!("{QUERY_TIMEOUT_ENV} must be a number of milliseconds, got `{raw}`"))
            })?,
            None => DEFAULT_QUERY_TIMEOUT_MS,
        };

        let config = Self {
            graph,
            query_timeout_ms,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.query_timeout_ms == 0 {
            return Err(StoreError::Config("query timeout must be positive".into()));
        }
        if self.seed_timeout_ms == 0 {
            return Err(StoreError::Config("seed timeout must be positive".into()));
        }
        if let Some(graph) = &self.graph {
            graph.http_base_url()?;
            if graph.database.trim().is_empty() {
                return Err(StoreError::Config("graph database name is empty".into()));
            }
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn seed_timeout(&self) -> Duration {
        Duration::from_millis(self.seed_timeout_ms)
    }

    /// Why the graph is not in use, when it is not configured.
    pub fn disabled_reason(&self) -> Option<String> {
        self.graph
            .is_none()
            .then(|| format!("no graph database configured ({NEO4J_PASSWORD_ENV} not set)"))
    }
}
