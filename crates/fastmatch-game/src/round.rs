//! Dealing a round.

use crate::judge::Role;
use crate::{GameError, Result};
use fastmatch_plane::{CardId, Point};
use fastmatch_store::IncidenceStore;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Three distinct cards and who holds which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    #[serde(rename = "targetCardId")]
    pub target: CardId,
    #[serde(rename = "aiCardId")]
    pub ai: CardId,
    #[serde(rename = "humanCardId")]
    pub human: CardId,
}

impl Round {
    pub fn new(target: CardId, ai: CardId, human: CardId) -> Result<Self> {
        if target == ai || target == human || ai == human {
            return Err(GameError::InvalidRound(format!(
                "cards must be distinct, got target {target}, ai {ai}, human {human}"
            )));
        }
        Ok(Self { target, ai, human })
    }

    pub fn card_ids(&self) -> [CardId; 3] {
        [self.target, self.ai, self.human]
    }

    /// The card `role` holds.
    pub fn card_of(&self, role: Role) -> CardId {
        match role {
            Role::Human => self.human,
            Role::Ai => self.ai,
        }
    }
}

/// Deal a round from cards `1..=card_count`, sampling without replacement.
///
/// The first sampled card is the target, then the AI's, then the human's,
/// so a seeded `rng` always deals the same round.
pub fn select_round<R: Rng + ?Sized>(rng: &mut R, card_count: u32) -> Result<Round> {
    if card_count < 3 {
        return Err(GameError::NotEnoughCards(card_count));
    }
    let picked = rand::seq::index::sample(rng, card_count as usize, 3);
    let card = |i: usize| CardId::new(picked.index(i) as u32 + 1);
    let round = Round::new(card(0), card(1), card(2))?;
    tracing::debug!(target_card = %round.target, ai = %round.ai, human = %round.human, "dealt round");
    Ok(round)
}

/// Everything a player is shown for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub round: Round,
    pub target: Vec<Point>,
    pub ai: Vec<Point>,
    pub human: Vec<Point>,
    /// Names on any of the three cards
    pub choices: BTreeSet<String>,
}

impl RoundView {
    pub async fn load(store: &dyn IncidenceStore, round: Round) -> Result<Self> {
        let target = store.symbols_on_card(round.target).await?;
        let ai = store.symbols_on_card(round.ai).await?;
        let human = store.symbols_on_card(round.human).await?;
        let choices = target
            .iter()
            .chain(&ai)
            .chain(&human)
            .map(|p| p.name.clone())
            .collect();
        Ok(Self {
            round,
            target,
            ai,
            human,
            choices,
        })
    }

    /// Symbols on the card `role` holds.
    pub fn hand(&self, role: Role) -> &[Point] {
        match role {
            Role::Human => &self.human,
            Role::Ai => &self.ai,
        }
    }

    /// Names `role` may answer with.
    pub fn names_for(&self, role: Role) -> Vec<String> {
        self.hand(role).iter().map(|p| p.name.clone()).collect()
    }
}
