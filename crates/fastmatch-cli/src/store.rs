//! Store selection flags.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use fastmatch_plane::{build, PlaneStructure, DEFAULT_ORDER};
use fastmatch_store::{
    open_store, select_store, ActiveStore, GraphDriver, MemoryGraph, Neo4jHttpDriver, StoreConfig,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphMode {
    /// Use Neo4j when NEO4J_PASSWORD is set, memory otherwise
    Auto,
    /// Never touch a graph database
    Off,
    /// Seed and query an in-process graph
    Memory,
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Where queries are answered from
    #[arg(long, value_enum, default_value_t = GraphMode::Auto, global = true)]
    pub graph: GraphMode,

    /// Bound on each graph query in milliseconds [env: FASTMATCH_QUERY_TIMEOUT_MS]
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

impl StoreArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Result<StoreConfig> {
        let mut config = StoreConfig::from_env().context("reading store configuration")?;
        if let Some(ms) = self.timeout_ms {
            config.query_timeout_ms = ms;
        }
        if self.graph == GraphMode::Off {
            config.graph = None;
        }
        config.validate().context("invalid store configuration")?;
        Ok(config)
    }

    /// A driver for the graph these flags select, if any.
    pub fn driver(&self, config: &StoreConfig) -> Result<Option<Arc<dyn GraphDriver>>> {
        match self.graph {
            GraphMode::Off => Ok(None),
            GraphMode::Memory => Ok(Some(Arc::new(MemoryGraph::new()))),
            GraphMode::Auto => match &config.graph {
                Some(graph) => {
                    let driver = Neo4jHttpDriver::new(graph, config.query_timeout())
                        .context("configuring the Neo4j driver")?
                        .with_write_timeout(config.seed_timeout());
                    Ok(Some(Arc::new(driver)))
                }
                None => Ok(None),
            },
        }
    }

    /// Build the deck and pick the store for this process.
    pub async fn open(&self) -> Result<(Arc<PlaneStructure>, ActiveStore)> {
        let plane = deck()?;
        let config = self.config()?;
        let active = match self.graph {
            GraphMode::Auto => open_store(plane.clone(), &config).await,
            GraphMode::Off | GraphMode::Memory => {
                let driver = self.driver(&config)?;
                select_store(plane.clone(), driver, &config).await
            }
        }
        .context("opening the incidence store")?;
        Ok((plane, active))
    }

    /// The graph driver, failing when none is configured.
    pub fn require_driver(&self, config: &StoreConfig) -> Result<Arc<dyn GraphDriver>> {
        match self.driver(config)? {
            Some(driver) => Ok(driver),
            None if self.graph == GraphMode::Off => bail!("--graph off selects no graph database"),
            None => bail!(
                "no graph database configured; set NEO4J_PASSWORD (and NEO4J_URI) or pass --graph memory"
            ),
        }
    }
}

/// The canonical deck.
pub fn deck() -> Result<Arc<PlaneStructure>> {
    let plane = build(DEFAULT_ORDER).context("building the deck")?;
    Ok(Arc::new(plane))
}
