//! In-process incidence store.

use crate::{check_card, check_pair, unique_shared, EntityKind, IncidenceStore, Result, StoreError, StoreMode};
use async_trait::async_trait;
use fastmatch_plane::{CardId, PlaneStructure, Point, PointId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Answers every query from the plane's own adjacency indexes.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    plane: Arc<PlaneStructure>,
}

impl InMemoryStore {
    pub fn new(plane: Arc<PlaneStructure>) -> Self {
        Self { plane }
    }

    pub fn plane(&self) -> &Arc<PlaneStructure> {
        &self.plane
    }

    fn max_card(&self) -> u32 {
        self.plane.len() as u32
    }

    fn points(&self, ids: &[PointId]) -> Result<Vec<Point>> {
        ids.iter().map(|id| lookup_point(&self.plane, *id)).collect()
    }
}

pub(crate) fn lookup_point(plane: &PlaneStructure, id: PointId) -> Result<Point> {
    plane.point(id).cloned().ok_or(StoreError::NotFound {
        kind: EntityKind::Symbol,
        id: id.raw(),
        max: plane.len() as u32,
    })
}

#[async_trait]
impl IncidenceStore for InMemoryStore {
    async fn symbols_on_card(&self, card: CardId) -> Result<Vec<Point>> {
        check_card(card, self.max_card())?;
        let ids = self.plane.points_on_line(card).unwrap_or_default();
        self.points(ids)
    }

    async fn shared_symbol(&self, a: CardId, b: CardId) -> Result<Point> {
        check_pair(a, b, self.max_card())?;
        let ids = self.plane.shared_points(a, b).unwrap_or_default();
        unique_shared(a, b, self.points(&ids)?)
    }

    async fn all_symbol_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.plane.names().map(str::to_string).collect())
    }

    async fn point(&self, id: PointId) -> Result<Point> {
        lookup_point(&self.plane, id)
    }

    async fn point_by_name(&self, name: &str) -> Result<Option<Point>> {
        Ok(self.plane.point_by_name(name).cloned())
    }

    fn card_count(&self) -> u32 {
        self.max_card()
    }

    fn mode(&self) -> StoreMode {
        StoreMode::Fallback
    }
}
