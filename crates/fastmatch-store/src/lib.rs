//! Fastmatch Incidence Store
//!
//! One query contract, two backends:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         INCIDENCE STORE                              │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  ┌─────────────┐      ┌──────────────────┐      ┌────────────────┐  │
//! │  │   Plane     │─────►│  startup probe   │─────►│  GraphBacked   │  │
//! │  │  (Arc, RO)  │      │  (once/process)  │  ok  │  (Neo4j, ...)  │  │
//! │  └─────────────┘      └──────────────────┘      └────────────────┘  │
//! │         │                      │ unavailable                         │
//! │         │                      ▼                                     │
//! │         │             ┌──────────────────┐                           │
//! │         └────────────►│    InMemory      │                           │
//! │                       │  (adjacency idx) │                           │
//! │                       └──────────────────┘                           │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Features
//!
//! - **Identical answers**: both variants serve the same plane, so a round
//!   plays the same with or without the database
//! - **Idempotent seeding**: the graph is populated once and left alone after
//! - **Fail closed**: every graph call is bounded by a timeout and surfaces
//!   as [`StoreError::Unavailable`]
//! - **Mode fixed at startup**: no failover once queries are being served

pub mod config;
pub mod graph;
pub mod memory;
pub mod seed;
pub mod startup;


use async_trait::async_trait;
use fastmatch_plane::{CardId, Point, PointId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub use config::{GraphConfig, StoreConfig};
pub use graph::memory_graph::MemoryGraph;
pub use graph::neo4j::Neo4jHttpDriver;
pub use graph::{DeckRows, GraphBackedStore, GraphCounts, GraphDriver};
pub use memory::InMemoryStore;
pub use seed::{seed_graph, SeedOutcome, SeedReport};
pub use startup::{open_store, select_store, ActiveStore};

// ============================================================================
// Errors
// ============================================================================

/// What an out-of-range id referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Card,
    Symbol,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Card => write!(f, "card"),
            EntityKind::Symbol => write!(f, "symbol"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} not found (valid ids are 1..={max})")]
    NotFound { kind: EntityKind, id: u32, max: u32 },
    #[error("card {0} cannot be compared with itself")]
    SameCard(CardId),
    #[error("incidence invariant violated: {0}")]
    InvariantViolation(String),
    #[error("graph store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid store configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Query Contract
// ============================================================================

/// Which backend answers queries for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreMode {
    #[serde(rename = "GraphMode")]
    Graph,
    #[serde(rename = "FallbackMode")]
    Fallback,
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Graph => write!(f, "GraphMode"),
            StoreMode::Fallback => write!(f, "FallbackMode"),
        }
    }
}

/// Availability report for the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub mode: StoreMode,
}

/// Queries the round and validation logic runs against the deck.
#[async_trait]
pub trait IncidenceStore: Send + Sync {
    /// Symbols on a card, ascending by id.
    async fn symbols_on_card(&self, card: CardId) -> Result<Vec<Point>>;

    /// The single symbol two distinct cards have in common.
    async fn shared_symbol(&self, a: CardId, b: CardId) -> Result<Point>;

    /// Every symbol name of the deck.
    async fn all_symbol_names(&self) -> Result<BTreeSet<String>>;

    /// Resolve a symbol by id.
    async fn point(&self, id: PointId) -> Result<Point>;

    /// Resolve a symbol by name (trimmed, case-insensitive).
    async fn point_by_name(&self, name: &str) -> Result<Option<Point>>;

    /// Number of cards; valid card ids are `1..=card_count()`.
    fn card_count(&self) -> u32;

    fn mode(&self) -> StoreMode;

    fn health(&self) -> Health {
        Health { mode: self.mode() }
    }
}

// ============================================================================
// Shared Checks
// ============================================================================

pub(crate) fn check_card(card: CardId, max: u32) -> Result<()> {
    if (1..=max).contains(&card.raw()) {
        Ok(())
    } else {
        Err(StoreError::NotFound {
            kind: EntityKind::Card,
            id: card.raw(),
            max,
        })
    }
}

pub(crate) fn check_pair(a: CardId, b: CardId, max: u32) -> Result<()> {
    check_card(a, max)?;
    check_card(b, max)?;
    if a == b {
        return Err(StoreError::SameCard(a));
    }
    Ok(())
}

/// Exactly one shared symbol, or an invariant violation.
pub(crate) fn unique_shared(a: CardId, b: CardId, mut shared: Vec<Point>) -> Result<Point> {
    match shared.len() {
        1 => Ok(shared.remove(0)),
        n => Err(StoreError::InvariantViolation(format!(
            "cards {a} and {b} share {n} symbols, expected exactly 1"
        ))),
    }
}
