//! Points, lines and the projective plane built over GF(q).
//!
//! The classical construction: the non-zero vectors of GF(q)^3, taken up to
//! scalar multiples, are both the points and (as dual vectors) the lines. A
//! point lies on a line exactly when the two vectors are orthogonal.
//!
//! Each class is represented by its normalized vector (first non-zero
//! coordinate equal to 1) and the classes are enumerated in a fixed order:
//!
//! ```text
//! (1, a, b)   a, b in 0..q     ids 1 ..= q^2
//! (0, 1, b)   b in 0..q        ids q^2 + 1 ..= q^2 + q
//! (0, 0, 1)                    id  q^2 + q + 1
//! ```
//!
//! The same index is used for the point and the line, so point `i` and card
//! `i` are dual to each other.

use crate::audit::AuditReport;
use crate::field::PrimeField;
use crate::symbols::default_labels;
use crate::{PlaneError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The order of the plane the game is played on.
pub const DEFAULT_ORDER: u32 = 7;

/// Largest order the builder accepts. Larger planes are never dealt and
/// their audit would dominate startup.
pub const MAX_ORDER: u32 = 97;

// ============================================================================
// Identifiers
// ============================================================================

/// Identity of a symbol, `1..=n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(u32);

impl PointId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a card, `1..=n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u32);

impl CardId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Points and Lines
// ============================================================================

/// A symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "pointId")]
    pub id: PointId,
    pub name: String,
}

/// A card: the ascending ids of the symbols printed on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    #[serde(rename = "cardId")]
    pub id: CardId,
    pub points: Vec<PointId>,
}

impl Line {
    pub fn contains(&self, point: PointId) -> bool {
        self.points.binary_search(&point).is_ok()
    }
}

/// Headline numbers of a plane, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaneSummary {
    pub order: u32,
    pub points: usize,
    pub lines: usize,
    pub degree: usize,
    pub incidences: usize,
}

// ============================================================================
// Plane Structure
// ============================================================================

/// An immutable projective plane with both adjacency indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneStructure {
    pub(crate) field: PrimeField,
    pub(crate) vectors: Vec<[u32; 3]>,
    pub(crate) points: Vec<Point>,
    pub(crate) lines: Vec<Line>,
    /// point index -> ascending cards through that point
    pub(crate) point_lines: Vec<Vec<CardId>>,
}

impl PlaneStructure {
    pub fn order(&self) -> u32 {
        self.field.order()
    }

    /// Number of symbols on a card (and cards through a symbol).
    pub fn degree(&self) -> usize {
        self.order() as usize + 1
    }

    /// Number of points, which is also the number of lines.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.lines.iter().map(|line| line.id)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.points.iter().map(|p| p.name.as_str())
    }

    pub fn incidence_count(&self) -> usize {
        self.lines.iter().map(|line| line.points.len()).sum()
    }

    fn slot(&self, raw: u32) -> Option<usize> {
        let idx = (raw as usize).checked_sub(1)?;
        (idx < self.len()).then_some(idx)
    }

    pub fn contains_card(&self, card: CardId) -> bool {
        self.slot(card.raw()).is_some()
    }

    pub fn contains_point(&self, point: PointId) -> bool {
        self.slot(point.raw()).is_some()
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.slot(id.raw()).map(|idx| &self.points[idx])
    }

    pub fn line(&self, id: CardId) -> Option<&Line> {
        self.slot(id.raw()).map(|idx| &self.lines[idx])
    }

    /// Trimmed, case-insensitive name lookup.
    pub fn point_by_name(&self, name: &str) -> Option<&Point> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.points
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn points_on_line(&self, card: CardId) -> Option<&[PointId]> {
        self.line(card).map(|line| line.points.as_slice())
    }

    pub fn lines_through(&self, point: PointId) -> Option<&[CardId]> {
        self.slot(point.raw()).map(|idx| self.point_lines[idx].as_slice())
    }

    pub fn is_incident(&self, point: PointId, card: CardId) -> bool {
        self.line(card).is_some_and(|line| line.contains(point))
    }

    /// Points on both cards; `None` if either card is unknown.
    pub fn shared_points(&self, a: CardId, b: CardId) -> Option<Vec<PointId>> {
        Some(intersect_sorted(
            self.points_on_line(a)?,
            self.points_on_line(b)?,
        ))
    }

    /// Cards through both points; `None` if either point is unknown.
    pub fn shared_lines(&self, a: PointId, b: PointId) -> Option<Vec<CardId>> {
        Some(intersect_sorted(self.lines_through(a)?, self.lines_through(b)?))
    }

    pub fn point_coordinates(&self, id: PointId) -> Option<[u32; 3]> {
        self.slot(id.raw()).map(|idx| self.vectors[idx])
    }

    pub fn line_coordinates(&self, id: CardId) -> Option<[u32; 3]> {
        self.slot(id.raw()).map(|idx| self.vectors[idx])
    }

    /// The affine equation a card stands for, e.g. `y = 3x + 2`.
    pub fn describe_line(&self, id: CardId) -> Option<String> {
        let [l0, l1, l2] = self.line_coordinates(id)?;
        let f = self.field;
        let text = match (l1, l2) {
            (0, 0) => "line at infinity".to_string(),
            (_, 0) => format!("x = {}", f.div(f.neg(l0), l1)?),
            _ => format!(
                "y = {}x + {}",
                f.div(f.neg(l1), l2)?,
                f.div(f.neg(l0), l2)?
            ),
        };
        Some(text)
    }

    /// Affine position of a symbol, or the direction it stands for at infinity.
    pub fn describe_point(&self, id: PointId) -> Option<String> {
        let text = match self.point_coordinates(id)? {
            [1, x, y] => format!("({x}, {y})"),
            [0, 1, m] => format!("slope {m} at infinity"),
            _ => "vertical at infinity".to_string(),
        };
        Some(text)
    }

    pub fn summary(&self) -> PlaneSummary {
        PlaneSummary {
            order: self.order(),
            points: self.points.len(),
            lines: self.lines.len(),
            degree: self.degree(),
            incidences: self.incidence_count(),
        }
    }
}

fn intersect_sorted<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

// ============================================================================
// Builder
// ============================================================================

/// Builds a [`PlaneStructure`] for a prime order.
#[derive(Debug, Clone)]
pub struct PlaneBuilder {
    order: u32,
    labels: Option<Vec<String>>,
}

impl Default for PlaneBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}

impl PlaneBuilder {
    pub fn new(order: u32) -> Self {
        Self {
            order,
            labels: None,
        }
    }

    /// Replace the default labels. Must be `q^2 + q + 1` distinct, non-blank
    /// names, checked in [`PlaneBuilder::build`].
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    /// Construct the plane and audit it.
    pub fn build(&self) -> Result<PlaneStructure> {
        let order = self.order;
        if order > MAX_ORDER {
            return Err(construction(
                order,
                format!("orders above {MAX_ORDER} are not supported"),
            ));
        }
        let field = PrimeField::new(order).ok_or_else(|| {
            let reason = if order < 2 {
                "order must be at least 2"
            } else {
                "only prime orders have an implemented construction"
            };
            construction(order, reason)
        })?;

        let vectors = normalized_vectors(field);
        let count = vectors.len();
        let labels = self.resolve_labels(count)?;

        let points: Vec<Point> = labels
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Point {
                id: PointId::new(idx as u32 + 1),
                name,
            })
            .collect();

        let degree = order as usize + 1;
        let mut point_lines: Vec<Vec<CardId>> = vec![Vec::with_capacity(degree); count];
        let mut lines = Vec::with_capacity(count);
        for (line_idx, line_vec) in vectors.iter().enumerate() {
            let card = CardId::new(line_idx as u32 + 1);
            let mut on_line = Vec::with_capacity(degree);
            for (point_idx, point_vec) in vectors.iter().enumerate() {
                if field.dot(*point_vec, *line_vec) == 0 {
                    on_line.push(PointId::new(point_idx as u32 + 1));
                    point_lines[point_idx].push(card);
                }
            }
            lines.push(Line {
                id: card,
                points: on_line,
            });
        }

        let plane = PlaneStructure {
            field,
            vectors,
            points,
            lines,
            point_lines,
        };
        let AuditReport {
            line_pairs,
            point_pairs,
            ..
        } = plane.verify()?;
        tracing::debug!(
            order,
            points = plane.len(),
            degree,
            line_pairs,
            point_pairs,
            "built projective plane"
        );
        Ok(plane)
    }

    fn resolve_labels(&self, count: usize) -> Result<Vec<String>> {
        let Some(labels) = &self.labels else {
            return Ok(default_labels(count));
        };
        if labels.len() != count {
            return Err(construction(
                self.order,
                format!("expected {count} labels, got {}", labels.len()),
            ));
        }
        let mut seen = BTreeSet::new();
        for label in labels {
            let key = label.trim().to_lowercase();
            if key.is_empty() {
                return Err(construction(self.order, "labels must not be blank"));
            }
            if !seen.insert(key) {
                return Err(construction(
                    self.order,
                    format!("duplicate label `{}`", label.trim()),
                ));
            }
        }
        Ok(labels.iter().map(|l| l.trim().to_string()).collect())
    }
}

/// Build the plane of the given order with default labels.
pub fn build(order: u32) -> Result<PlaneStructure> {
    PlaneBuilder::new(order).build()
}

fn construction(order: u32, reason: impl Into<String>) -> PlaneError {
    PlaneError::Construction {
        order,
        reason: reason.into(),
    }
}

fn normalized_vectors(field: PrimeField) -> Vec<[u32; 3]> {
    let q = field.order() as usize;
    let mut out = Vec::with_capacity(q * q + q + 1);
    for a in field.elements() {
        for b in field.elements() {
            out.push([1, a, b]);
        }
    }
    for b in field.elements() {
        out.push([0, 1, b]);
    }
    out.push([0, 0, 1]);
    out
}
