//! Judging a claimed answer.

use crate::round::Round;
use crate::Result;
use fastmatch_plane::{Point, PointId};
use fastmatch_store::IncidenceStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Human => write!(f, "human"),
            Role::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Role::Human),
            "ai" => Ok(Role::Ai),
            other => Err(format!("unknown role `{other}` (expected human or ai)")),
        }
    }
}

/// A player's answer, by symbol id, by name, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub point_id: Option<PointId>,
    pub name: Option<String>,
}

impl Claim {
    pub fn by_id(id: PointId) -> Self {
        Self {
            point_id: Some(id),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            point_id: None,
            name: Some(name.into()),
        }
    }

    /// A numeric answer is an id; anything else is a name.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.parse::<u32>() {
            Ok(raw) => Self::by_id(PointId::new(raw)),
            Err(_) => Self::by_name(input),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.point_id.is_none() && self.name.as_deref().map_or(true, |n| n.trim().is_empty())
    }

    /// Whether this claim names `truth`.
    pub fn matches(&self, truth: &Point) -> bool {
        if self.point_id == Some(truth.id) {
            return true;
        }
        self.name
            .as_deref()
            .map(str::trim)
            .is_some_and(|name| !name.is_empty() && name.eq_ignore_ascii_case(truth.name.trim()))
    }
}

/// Outcome of judging a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub expected: Point,
}

/// Check `claim` against the symbol `role`'s card shares with the target.
pub async fn judge(
    store: &dyn IncidenceStore,
    round: &Round,
    role: Role,
    claim: &Claim,
) -> Result<Verdict> {
    let expected = store.shared_symbol(round.card_of(role), round.target).await?;
    let correct = claim.matches(&expected);
    tracing::debug!(%role, correct, expected = %expected.name, "judged claim");
    Ok(Verdict { correct, expected })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn music_notes() -> Point {
        Point {
            id: PointId::new(50),
            name: "Music notes".into(),
        }
    }

    #[test]
    fn test_claim_parse() {
        assert_eq!(Claim::parse(" 50 "), Claim::by_id(PointId::new(50)));
        assert_eq!(Claim::parse("Music notes"), Claim::by_name("Music notes"));
        assert!(Claim::parse("  ").is_empty());
    }

    #[test]
    fn test_claim_matching() {
        let truth = music_notes();
        assert!(Claim::by_id(PointId::new(50)).matches(&truth));
        assert!(Claim::by_name("  MUSIC notes ").matches(&truth));
        assert!(!Claim::by_id(PointId::new(49)).matches(&truth));
        assert!(!Claim::by_name("Music").matches(&truth));
        assert!(!Claim::by_name("").matches(&truth));
        assert!(!Claim::default().matches(&truth));
    }

    #[test]
    fn test_either_field_may_match() {
        let claim = Claim {
            point_id: Some(PointId::new(3)),
            name: Some("Music notes".into()),
        };
        assert!(claim.matches(&music_notes()));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(" AI ".parse::<Role>(), Ok(Role::Ai));
        assert_eq!("human".parse::<Role>(), Ok(Role::Human));
        assert!("robot".parse::<Role>().is_err());
    }
}
