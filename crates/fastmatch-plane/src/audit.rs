//! Exhaustive invariant audit of a [`PlaneStructure`].
//!
//! Checked invariants:
//! 1. `q^2 + q + 1` points and lines, ids dense from 1
//! 2. every line holds exactly `q + 1` distinct points
//! 3. every point lies on exactly `q + 1` lines
//! 4. every pair of distinct lines meets in exactly one point
//! 5. every pair of distinct points lies on exactly one line
//!
//! Pair checks walk each point's pencil (and each line's range), marking the
//! pairs they cover in a bitset. A pair marked twice shares two elements; a
//! pair never marked shares none. This costs `O(n q^2)` instead of comparing
//! all `n^2` pairs.

use crate::plane::PlaneStructure;
use crate::{PlaneError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What an audit covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub order: u32,
    pub points: usize,
    pub lines: usize,
    pub degree: usize,
    pub line_pairs: usize,
    pub point_pairs: usize,
}

impl PlaneStructure {
    /// Check every invariant; the first violation found is returned.
    pub fn verify(&self) -> Result<AuditReport> {
        let q = self.order() as usize;
        let expected = q * q + q + 1;
        let degree = q + 1;

        if self.points.len() != expected || self.lines.len() != expected {
            return Err(violation(format!(
                "expected {expected} points and lines, found {} and {}",
                self.points.len(),
                self.lines.len()
            )));
        }
        if self.point_lines.len() != expected || self.vectors.len() != expected {
            return Err(violation("adjacency index does not cover every point"));
        }

        let mut names = BTreeSet::new();
        for (idx, point) in self.points.iter().enumerate() {
            if point.id.raw() as usize != idx + 1 {
                return Err(violation(format!(
                    "point at position {} has id {}",
                    idx + 1,
                    point.id
                )));
            }
            if !names.insert(point.name.to_lowercase()) {
                return Err(violation(format!("duplicate symbol name `{}`", point.name)));
            }
        }

        let mut point_degree = vec![0usize; expected];
        for (idx, line) in self.lines.iter().enumerate() {
            if line.id.raw() as usize != idx + 1 {
                return Err(violation(format!(
                    "card at position {} has id {}",
                    idx + 1,
                    line.id
                )));
            }
            if line.points.len() != degree {
                return Err(violation(format!(
                    "card {} holds {} symbols, expected {degree}",
                    line.id,
                    line.points.len()
                )));
            }
            if line.points.windows(2).any(|w| w[0] >= w[1]) {
                return Err(violation(format!(
                    "symbols of card {} are not strictly ascending",
                    line.id
                )));
            }
            for point in &line.points {
                let slot = (point.raw() as usize)
                    .checked_sub(1)
                    .filter(|&s| s < expected)
                    .ok_or_else(|| {
                        violation(format!("card {} names unknown symbol {point}", line.id))
                    })?;
                point_degree[slot] += 1;
            }
        }

        for (idx, (&found, pencil)) in point_degree.iter().zip(&self.point_lines).enumerate() {
            let id = idx + 1;
            if found != degree {
                return Err(violation(format!(
                    "symbol {id} appears on {found} cards, expected {degree}"
                )));
            }
            let point = self.points[idx].id;
            let consistent = pencil.len() == degree
                && pencil.windows(2).all(|w| w[0] < w[1])
                && pencil
                    .iter()
                    .all(|card| self.line(*card).is_some_and(|line| line.contains(point)));
            if !consistent {
                return Err(violation(format!(
                    "card index for symbol {id} disagrees with the cards"
                )));
            }
        }

        let line_pairs = audit_pairs(
            expected,
            self.point_lines
                .iter()
                .map(|pencil| pencil.iter().map(|c| c.raw() as usize - 1).collect()),
            ("cards", "symbol"),
        )?;
        let point_pairs = audit_pairs(
            expected,
            self.lines
                .iter()
                .map(|line| line.points.iter().map(|p| p.raw() as usize - 1).collect()),
            ("symbols", "card"),
        )?;

        Ok(AuditReport {
            order: self.order(),
            points: expected,
            lines: expected,
            degree,
            line_pairs,
            point_pairs,
        })
    }
}

/// Every pair of `0..n` must appear in exactly one group.
fn audit_pairs<I>(n: usize, groups: I, (kind, via): (&str, &str)) -> Result<usize>
where
    I: IntoIterator<Item = Vec<usize>>,
{
    let mut seen = vec![0u64; (n * n).div_ceil(64)];
    let mut covered = 0usize;
    for group in groups {
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                let bit = lo * n + hi;
                let (word, mask) = (bit / 64, 1u64 << (bit % 64));
                if seen[word] & mask != 0 {
                    return Err(violation(format!(
                        "{kind} {} and {} share more than one {via}",
                        lo + 1,
                        hi + 1
                    )));
                }
                seen[word] |= mask;
                covered += 1;
            }
        }
    }

    let expected = n * n.saturating_sub(1) / 2;
    if covered != expected {
        for lo in 0..n {
            for hi in lo + 1..n {
                let bit = lo * n + hi;
                if seen[bit / 64] & (1u64 << (bit % 64)) == 0 {
                    return Err(violation(format!(
                        "{kind} {} and {} share no {via}",
                        lo + 1,
                        hi + 1
                    )));
                }
            }
        }
    }
    Ok(covered)
}

fn violation(message: impl Into<String>) -> PlaneError {
    PlaneError::InvariantViolation(message.into())
}
