//! In-process property graph with merge semantics.
//!
//! Stands in for a database in tests and in `--graph memory` runs. It can
//! be taken offline, slowed down, or have edges added and removed to
//! simulate outages and corrupt data.

use super::{DeckRows, GraphCounts, GraphDriver};
use crate::{Result, StoreError};
use async_trait::async_trait;
use fastmatch_plane::{CardId, PointId};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct Tables {
    points: BTreeMap<PointId, String>,
    cards: BTreeMap<CardId, String>,
    /// (card, point), so a card's points are a contiguous range
    edges: BTreeSet<(CardId, PointId)>,
}

impl Tables {
    fn points_on(&self, card: CardId) -> impl Iterator<Item = PointId> + '_ {
        self.edges
            .range((card, PointId::new(0))..=(card, PointId::new(u32::MAX)))
            .map(|(_, point)| *point)
    }
}

#[derive(Debug)]
pub struct MemoryGraph {
    tables: RwLock<Tables>,
    online: AtomicBool,
    latency: Option<Duration>,
    merges: AtomicUsize,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            online: AtomicBool::new(true),
            latency: None,
            merges: AtomicUsize::new(0),
        }
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// How many times [`GraphDriver::merge_deck`] wrote to the tables.
    pub fn merge_calls(&self) -> usize {
        self.merges.load(Ordering::SeqCst)
    }

    /// Remove an `ON` edge; returns whether it existed.
    pub fn detach(&self, point: PointId, card: CardId) -> bool {
        self.tables.write().edges.remove(&(card, point))
    }

    /// Add an `ON` edge; returns whether it was new.
    pub fn attach(&self, point: PointId, card: CardId) -> bool {
        self.tables.write().edges.insert((card, point))
    }

    pub fn rename(&self, point: PointId, name: impl Into<String>) {
        self.tables.write().points.insert(point, name.into());
    }

    async fn enter(&self) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory graph is offline".into()))
        }
    }
}

#[async_trait]
impl GraphDriver for MemoryGraph {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        self.enter().await
    }

    async fn counts(&self) -> Result<GraphCounts> {
        self.enter().await?;
        let tables = self.tables.read();
        Ok(GraphCounts {
            points: tables.points.len() as u64,
            cards: tables.cards.len() as u64,
            incidences: tables.edges.len() as u64,
        })
    }

    async fn merge_deck(&self, deck: &DeckRows) -> Result<()> {
        self.enter().await?;
        let mut tables = self.tables.write();
        for point in &deck.points {
            tables.points.insert(point.id, point.name.clone());
        }
        for card in &deck.cards {
            tables.cards.insert(card.card_id, card.label.clone());
        }
        for edge in &deck.incidences {
            // MERGE on an edge matches both endpoints first
            if tables.points.contains_key(&edge.point_id) && tables.cards.contains_key(&edge.card_id) {
                tables.edges.insert((edge.card_id, edge.point_id));
            }
        }
        self.merges.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn points_on_card(&self, card: CardId) -> Result<Vec<PointId>> {
        self.enter().await?;
        Ok(self.tables.read().points_on(card).collect())
    }

    async fn shared_points(&self, a: CardId, b: CardId) -> Result<Vec<PointId>> {
        self.enter().await?;
        let tables = self.tables.read();
        let on_b: BTreeSet<PointId> = tables.points_on(b).collect();
        Ok(tables.points_on(a).filter(|p| on_b.contains(p)).collect())
    }

    async fn symbol_names(&self) -> Result<Vec<String>> {
        self.enter().await?;
        Ok(self.tables.read().points.values().cloned().collect())
    }
}
