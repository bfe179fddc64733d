//! Plane construction E2E tests

use fastmatch_plane::*;
use std::collections::BTreeSet;

// ============================================================================
// Counts and Degrees
// ============================================================================

#[test]
fn test_order_seven_counts() {
    let plane = build(DEFAULT_ORDER).unwrap();
    assert_eq!(plane.points().len(), 57);
    assert_eq!(plane.lines().len(), 57);
    assert_eq!(plane.incidence_count(), 456);
}

#[test]
fn test_every_card_holds_eight_symbols() {
    let plane = build(DEFAULT_ORDER).unwrap();
    for line in plane.lines() {
        let distinct: BTreeSet<_> = line.points.iter().collect();
        assert_eq!(line.points.len(), 8, "card {}", line.id);
        assert_eq!(distinct.len(), 8, "card {}", line.id);
    }
}

#[test]
fn test_every_symbol_is_on_eight_cards() {
    let plane = build(DEFAULT_ORDER).unwrap();
    for point in plane.points() {
        let cards = plane
            .lines()
            .iter()
            .filter(|line| line.contains(point.id))
            .count();
        assert_eq!(cards, 8, "symbol {}", point.id);
        assert_eq!(plane.lines_through(point.id).unwrap().len(), 8);
    }
}

// ============================================================================
// Pairwise Invariants (checked by brute force, independent of the audit)
// ============================================================================

#[test]
fn test_every_pair_of_cards_shares_exactly_one_symbol() {
    let plane = build(DEFAULT_ORDER).unwrap();
    let mut pairs = 0;
    for a in plane.lines() {
        for b in plane.lines().iter().filter(|b| b.id > a.id) {
            let shared: Vec<_> = a.points.iter().filter(|p| b.points.contains(p)).collect();
            assert_eq!(shared.len(), 1, "cards {} and {}", a.id, b.id);
            pairs += 1;
        }
    }
    assert_eq!(pairs, 1596);
}

#[test]
fn test_every_pair_of_symbols_shares_exactly_one_card() {
    let plane = build(DEFAULT_ORDER).unwrap();
    let mut pairs = 0;
    for a in plane.points() {
        for b in plane.points().iter().filter(|b| b.id > a.id) {
            let cards = plane
                .lines()
                .iter()
                .filter(|line| line.contains(a.id) && line.contains(b.id))
                .count();
            assert_eq!(cards, 1, "symbols {} and {}", a.id, b.id);
            pairs += 1;
        }
    }
    assert_eq!(pairs, 1596);
}

#[test]
fn test_incidence_is_orthogonality() {
    let plane = build(DEFAULT_ORDER).unwrap();
    let field = PrimeField::new(DEFAULT_ORDER).unwrap();
    for line in plane.lines() {
        let l = plane.line_coordinates(line.id).unwrap();
        for point in plane.points() {
            let p = plane.point_coordinates(point.id).unwrap();
            assert_eq!(
                line.contains(point.id),
                field.dot(p, l) == 0,
                "symbol {} / card {}",
                point.id,
                line.id
            );
        }
    }
}

// ============================================================================
// Determinism and the Canonical Labeling
// ============================================================================

#[test]
fn test_builds_are_identical() {
    let first = build(DEFAULT_ORDER).unwrap();
    let second = PlaneBuilder::default().build().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cards_one_and_two_share_music_notes_across_builds() {
    for _ in 0..100 {
        let plane = build(DEFAULT_ORDER).unwrap();
        let shared = plane
            .shared_points(CardId::new(1), CardId::new(2))
            .unwrap();
        assert_eq!(shared, vec![PointId::new(50)]);
        assert_eq!(plane.point(shared[0]).unwrap().name, "Music notes");
    }
}

#[test]
fn test_labels_follow_the_catalog() {
    let plane = build(DEFAULT_ORDER).unwrap();
    for (point, (name, _glyph)) in plane.points().iter().zip(DECK_SYMBOLS.iter()) {
        assert_eq!(point.name, *name);
    }
    assert_eq!(emoji_for_name(&plane.points()[0].name), Some("⚓"));
}

#[test]
fn test_summary() {
    let summary = build(DEFAULT_ORDER).unwrap().summary();
    assert_eq!(
        summary,
        PlaneSummary {
            order: 7,
            points: 57,
            lines: 57,
            degree: 8,
            incidences: 456,
        }
    );
}

#[test]
fn test_construction_error_message() {
    let err = build(4).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot construct a projective plane of order 4: only prime orders have an implemented construction"
    );
}
