//! Fastmatch Plane: the incidence structure behind the deck
//!
//! Every card of the game is a *line* of a finite projective plane and every
//! symbol is a *point*. The plane of order 7 gives the deck its shape:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                PROJECTIVE PLANE OF ORDER q                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │   points  = non-zero vectors of GF(q)^3 up to scaling        │
//! │   lines   = the same classes, read as dual vectors           │
//! │   p on l  <=>  p · l ≡ 0 (mod q)                             │
//! │                                                              │
//! │   q = 7:  57 symbols, 57 cards, 8 symbols per card,          │
//! │           any two cards share exactly one symbol             │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - `field`: prime-field arithmetic used by the construction
//! - `plane`: ids, points, lines, the [`PlaneStructure`] and its builder
//! - `audit`: exhaustive invariant checks run after every build
//! - `symbols`: the fixed 57-symbol catalog of the deck

pub mod audit;
pub mod field;
pub mod plane;
pub mod symbols;

pub use audit::AuditReport;
pub use field::PrimeField;
pub use plane::{
    build, CardId, Line, PlaneBuilder, PlaneStructure, PlaneSummary, Point, PointId,
    DEFAULT_ORDER, MAX_ORDER,
};
pub use symbols::{emoji_for_name, DECK_SYMBOLS};

/// Errors raised while constructing or auditing a plane.
///
/// Both variants are fatal at startup: a process that cannot build a valid
/// deck must not serve queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaneError {
    #[error("cannot construct a projective plane of order {order}: {reason}")]
    Construction { order: u32, reason: String },
    #[error("plane invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, PlaneError>;
