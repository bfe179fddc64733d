//! Fastmatch Rounds
//!
//! A round deals three distinct cards: a target, one for the AI opponent and
//! one for the human. Each player has to name the symbol their card shares
//! with the target; [`judge`] checks the claim against the store.
//!
//! ```text
//!   select_round(rng) ──► Round ──► RoundView::load(store)   (what is shown)
//!                            │
//!   free text ──► extract_symbol_name ──► Claim ──► judge(store) ──► Verdict
//! ```

pub mod answer;
pub mod judge;
pub mod round;

pub use answer::extract_symbol_name;
pub use judge::{judge, Claim, Role, Verdict};
pub use round::{select_round, Round, RoundView};

use fastmatch_store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("a round needs at least 3 cards, the deck has {0}")]
    NotEnoughCards(u32),
    #[error("invalid round: {0}")]
    InvalidRound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, GameError>;
