//! Graph-backed incidence store.
//!
//! [`GraphDriver`] is the seam to the external database. [`GraphBackedStore`]
//! puts a deadline on every driver call and checks what comes back before
//! handing it to callers.
//!
//! Graph layout:
//!
//! ```text
//! (:Point:Symbol {pointId, name}) -[:ON]-> (:Line:Card {cardId, label})
//! ```

pub mod memory_graph;
pub mod neo4j;

use crate::{check_card, check_pair, unique_shared, IncidenceStore, Result, StoreError, StoreMode};
use async_trait::async_trait;
use fastmatch_plane::{CardId, PlaneStructure, Point, PointId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Driver Contract
// ============================================================================

/// Node and edge counts of a deck graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCounts {
    pub points: u64,
    pub cards: u64,
    pub incidences: u64,
}

impl GraphCounts {
    /// What a fully seeded graph of `plane` holds.
    pub fn expected(plane: &PlaneStructure) -> Self {
        Self {
            points: plane.points().len() as u64,
            cards: plane.lines().len() as u64,
            incidences: plane.incidence_count() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards == 0
    }
}

impl fmt::Display for GraphCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points, {} cards, {} incidences",
            self.points, self.cards, self.incidences
        )
    }
}

/// Row of a `Card` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRow {
    pub card_id: CardId,
    pub label: String,
}

/// Row of an `ON` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidenceRow {
    pub point_id: PointId,
    pub card_id: CardId,
}

/// Everything a driver writes when seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRows {
    pub points: Vec<Point>,
    pub cards: Vec<CardRow>,
    pub incidences: Vec<IncidenceRow>,
}

impl DeckRows {
    pub fn from_plane(plane: &PlaneStructure) -> Self {
        let cards = plane
            .lines()
            .iter()
            .map(|line| CardRow {
                card_id: line.id,
                label: plane.describe_line(line.id).unwrap_or_default(),
            })
            .collect();
        let incidences = plane
            .lines()
            .iter()
            .flat_map(|line| {
                line.points.iter().map(move |&point_id| IncidenceRow {
                    point_id,
                    card_id: line.id,
                })
            })
            .collect();
        Self {
            points: plane.points().to_vec(),
            cards,
            incidences,
        }
    }
}

/// Connection to a deck graph.
///
/// Implementations report network and query failures as
/// [`StoreError::Unavailable`]. Writes are merges, so re-running
/// [`GraphDriver::merge_deck`] never duplicates nodes or edges.
#[async_trait]
pub trait GraphDriver: Send + Sync {
    fn name(&self) -> &str;

    /// Cheap round trip proving the database answers.
    async fn ping(&self) -> Result<()>;

    async fn counts(&self) -> Result<GraphCounts>;

    async fn merge_deck(&self, deck: &DeckRows) -> Result<()>;

    /// Ids of the points on a card, ascending.
    async fn points_on_card(&self, card: CardId) -> Result<Vec<PointId>>;

    /// Ids of the points on both cards, ascending.
    async fn shared_points(&self, a: CardId, b: CardId) -> Result<Vec<PointId>>;

    async fn symbol_names(&self) -> Result<Vec<String>>;
}

/// Run `fut` under a deadline; elapsing is [`StoreError::Unavailable`].
pub(crate) async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        StoreError::Unavailable(format!("{what} timed out after {} ms", limit.as_millis()))
    })?
}

// ============================================================================
// Graph-Backed Store
// ============================================================================

/// Serves queries from a seeded graph.
///
/// Range checks run locally before any I/O. Symbol names are resolved
/// against the local plane, so the graph only has to agree on ids.
#[derive(Clone)]
pub struct GraphBackedStore {
    driver: Arc<dyn GraphDriver>,
    plane: Arc<PlaneStructure>,
    timeout: Duration,
}

impl GraphBackedStore {
    pub fn new(driver: Arc<dyn GraphDriver>, plane: Arc<PlaneStructure>, timeout: Duration) -> Self {
        Self {
            driver,
            plane,
            timeout,
        }
    }

    pub fn driver(&self) -> &Arc<dyn GraphDriver> {
        &self.driver
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn max_card(&self) -> u32 {
        self.plane.len() as u32
    }

    fn resolve(&self, ids: &[PointId], context: &str) -> Result<Vec<Point>> {
        ids.iter()
            .map(|id| {
                self.plane.point(*id).cloned().ok_or_else(|| {
                    StoreError::InvariantViolation(format!(
                        "graph returned unknown symbol {id} for {context}"
                    ))
                })
            })
            .collect()
    }
}

impl fmt::Debug for GraphBackedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphBackedStore")
            .field("driver", &self.driver.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl IncidenceStore for GraphBackedStore {
    async fn symbols_on_card(&self, card: CardId) -> Result<Vec<Point>> {
        check_card(card, self.max_card())?;
        let mut ids = bounded(
            self.timeout,
            "symbols_on_card",
            self.driver.points_on_card(card),
        )
        .await?;
        ids.sort_unstable();
        ids.dedup();

        let degree = self.plane.degree();
        if ids.len() != degree {
            return Err(StoreError::InvariantViolation(format!(
                "graph holds {} symbols on card {card}, expected {degree}",
                ids.len()
            )));
        }
        self.resolve(&ids, &format!("card {card}"))
    }

    async fn shared_symbol(&self, a: CardId, b: CardId) -> Result<Point> {
        check_pair(a, b, self.max_card())?;
        let mut ids = bounded(self.timeout, "shared_symbol", self.driver.shared_points(a, b)).await?;
        ids.sort_unstable();
        ids.dedup();
        let shared = self.resolve(&ids, &format!("cards {a} and {b}"))?;
        unique_shared(a, b, shared)
    }

    async fn all_symbol_names(&self) -> Result<BTreeSet<String>> {
        let names: BTreeSet<String> =
            bounded(self.timeout, "all_symbol_names", self.driver.symbol_names())
                .await?
                .into_iter()
                .collect();
        if names.len() != self.plane.len() {
            return Err(StoreError::InvariantViolation(format!(
                "graph holds {} distinct symbol names, expected {}",
                names.len(),
                self.plane.len()
            )));
        }
        if let Some(stray) = names
            .iter()
            .find(|name| !self.plane.names().any(|known| known == name.as_str()))
        {
            return Err(StoreError::InvariantViolation(format!(
                "graph holds symbol name `{stray}` that is not in the deck"
            )));
        }
        Ok(names)
    }

    async fn point(&self, id: PointId) -> Result<Point> {
        crate::memory::lookup_point(&self.plane, id)
    }

    async fn point_by_name(&self, name: &str) -> Result<Option<Point>> {
        Ok(self.plane.point_by_name(name).cloned())
    }

    fn card_count(&self) -> u32 {
        self.max_card()
    }

    fn mode(&self) -> StoreMode {
        StoreMode::Graph
    }
}
