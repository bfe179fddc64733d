//! Startup mode selection.
//!
//! The mode is decided exactly once:
//!
//! ```text
//! no graph configured ───────────────────────────────► Fallback (reason)
//! graph configured ──► ping ──► seed ──► GraphBacked   Graph
//!                        │        │
//!                        └────────┴── Unavailable ───► Fallback (reason)
//!                                 └── other error ───► fatal
//! ```

use crate::config::StoreConfig;
use crate::graph::neo4j::Neo4jHttpDriver;
use crate::graph::{bounded, GraphBackedStore, GraphDriver};
use crate::memory::InMemoryStore;
use crate::seed::{seed_graph, SeedReport};
use crate::{Health, IncidenceStore, Result, StoreError, StoreMode};
use fastmatch_plane::PlaneStructure;
use std::sync::Arc;

/// The store chosen at startup, plus how it was chosen.
#[derive(Clone)]
pub struct ActiveStore {
    store: Arc<dyn IncidenceStore>,
    fallback_reason: Option<String>,
    seed: Option<SeedReport>,
}

impl ActiveStore {
    pub fn store(&self) -> Arc<dyn IncidenceStore> {
        Arc::clone(&self.store)
    }

    pub fn mode(&self) -> StoreMode {
        self.store.mode()
    }

    pub fn health(&self) -> Health {
        self.store.health()
    }

    /// Why the graph is not being used, in Fallback mode.
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    pub fn seed_report(&self) -> Option<&SeedReport> {
        self.seed.as_ref()
    }

    fn fallback(plane: Arc<PlaneStructure>, reason: String) -> Self {
        tracing::warn!(%reason, "serving the deck from memory");
        Self {
            store: Arc::new(InMemoryStore::new(plane)),
            fallback_reason: Some(reason),
            seed: None,
        }
    }
}

impl std::fmt::Debug for ActiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveStore")
            .field("mode", &self.mode())
            .field("fallback_reason", &self.fallback_reason)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Open the store described by `config`, talking to Neo4j when configured.
pub async fn open_store(plane: Arc<PlaneStructure>, config: &StoreConfig) -> Result<ActiveStore> {
    config.validate()?;
    let driver: Option<Arc<dyn GraphDriver>> = match &config.graph {
        Some(graph) => Some(Arc::new(
            Neo4jHttpDriver::new(graph, config.query_timeout())?
                .with_write_timeout(config.seed_timeout()),
        )),
        None => None,
    };
    select_store(plane, driver, config).await
}

/// Probe and seed `driver`, falling back to memory when it is unreachable.
///
/// Only [`StoreError::Unavailable`] triggers the fallback. An invariant
/// violation in the graph is fatal: serving a different deck from memory
/// would hide it.
pub async fn select_store(
    plane: Arc<PlaneStructure>,
    driver: Option<Arc<dyn GraphDriver>>,
    config: &StoreConfig,
) -> Result<ActiveStore> {
    let Some(driver) = driver else {
        let reason = config
            .disabled_reason()
            .unwrap_or_else(|| "no graph driver supplied".to_string());
        return Ok(ActiveStore::fallback(plane, reason));
    };

    let probed = async {
        bounded(config.query_timeout(), "graph probe", driver.ping()).await?;
        bounded(
            config.seed_timeout(),
            "graph seeding",
            seed_graph(driver.as_ref(), &plane),
        )
        .await
    }
    .await;

    match probed {
        Ok(report) => {
            tracing::info!(driver = driver.name(), outcome = %report.outcome, "serving the deck from the graph");
            let store = GraphBackedStore::new(driver, Arc::clone(&plane), config.query_timeout());
            Ok(ActiveStore {
                store: Arc::new(store),
                fallback_reason: None,
                seed: Some(report),
            })
        }
        Err(StoreError::Unavailable(reason)) => Ok(ActiveStore::fallback(
            plane,
            format!("{} graph unavailable: {reason}", driver.name()),
        )),
        Err(err) => Err(err),
    }
}
