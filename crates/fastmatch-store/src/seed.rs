//! Idempotent seeding of a deck graph.

use crate::graph::{DeckRows, GraphCounts, GraphDriver};
use crate::{Result, StoreError};
use fastmatch_plane::{PlaneStructure, PointId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOutcome {
    /// Card nodes were already present; nothing was written.
    AlreadyLoaded,
    /// The deck was merged into an empty graph.
    JustLoaded,
}

impl fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedOutcome::AlreadyLoaded => write!(f, "already loaded"),
            SeedOutcome::JustLoaded => write!(f, "just loaded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub outcome: SeedOutcome,
    pub counts: GraphCounts,
}

/// Load `plane` into the graph unless a deck is already there.
///
/// Either way the graph must then hold exactly this plane: the same counts,
/// the same symbols on every card and the same names. A graph holding some
/// other deck or a half-finished seed is an [`StoreError::InvariantViolation`].
pub async fn seed_graph(driver: &dyn GraphDriver, plane: &PlaneStructure) -> Result<SeedReport> {
    let expected = GraphCounts::expected(plane);
    let before = driver.counts().await?;

    let outcome = if before.is_empty() {
        tracing::info!(driver = driver.name(), %expected, "seeding deck graph");
        driver.merge_deck(&DeckRows::from_plane(plane)).await?;
        SeedOutcome::JustLoaded
    } else {
        tracing::debug!(driver = driver.name(), counts = %before, "deck graph already loaded");
        SeedOutcome::AlreadyLoaded
    };

    let counts = match outcome {
        SeedOutcome::JustLoaded => driver.counts().await?,
        SeedOutcome::AlreadyLoaded => before,
    };
    if counts != expected {
        return Err(StoreError::InvariantViolation(format!(
            "deck graph holds {counts}, expected {expected}"
        )));
    }
    verify_contents(driver, plane).await?;

    tracing::info!(driver = driver.name(), %outcome, %counts, "deck graph ready");
    Ok(SeedReport { outcome, counts })
}

/// Compare every card and the name set against `plane`.
async fn verify_contents(driver: &dyn GraphDriver, plane: &PlaneStructure) -> Result<()> {
    for line in plane.lines() {
        let mut held: Vec<PointId> = driver.points_on_card(line.id).await?;
        held.sort_unstable();
        held.dedup();
        if held != line.points {
            return Err(StoreError::InvariantViolation(format!(
                "graph card {} does not hold the deck's symbols ({} of {} match)",
                line.id,
                held.iter().filter(|p| line.points.contains(p)).count(),
                line.points.len()
            )));
        }
    }

    let held: BTreeSet<String> = driver.symbol_names().await?.into_iter().collect();
    let expected: BTreeSet<String> = plane.names().map(str::to_string).collect();
    if held != expected {
        let missing = expected.difference(&held).count();
        return Err(StoreError::InvariantViolation(format!(
            "graph symbol names differ from the deck ({missing} of {} missing)",
            expected.len()
        )));
    }
    Ok(())
}
