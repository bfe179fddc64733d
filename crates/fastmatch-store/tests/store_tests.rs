//! Store behavior across both variants and startup selection.

use async_trait::async_trait;
use fastmatch_plane::{build, CardId, PlaneStructure, PointId};
use fastmatch_store::{
    seed_graph, select_store, DeckRows, GraphBackedStore, GraphCounts, GraphDriver,
    IncidenceStore, InMemoryStore, MemoryGraph, SeedOutcome, StoreConfig, StoreError, StoreMode,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn plane() -> Arc<PlaneStructure> {
    Arc::new(build(7).unwrap())
}

async fn both_variants() -> (InMemoryStore, GraphBackedStore) {
    let plane = plane();
    let graph = Arc::new(MemoryGraph::new());
    seed_graph(graph.as_ref(), &plane).await.unwrap();
    (
        InMemoryStore::new(plane.clone()),
        GraphBackedStore::new(graph, plane, Duration::from_secs(5)),
    )
}

#[tokio::test]
async fn test_variants_agree_on_every_pair() {
    let (memory, graph) = both_variants().await;
    let mut pairs = 0;
    for a in 1..=57 {
        for b in a + 1..=57 {
            let (a, b) = (CardId::new(a), CardId::new(b));
            let expected = memory.shared_symbol(a, b).await.unwrap();
            assert_eq!(graph.shared_symbol(a, b).await.unwrap(), expected);
            assert_eq!(graph.shared_symbol(b, a).await.unwrap(), expected);
            pairs += 1;
        }
    }
    assert_eq!(pairs, 1596);
}

#[tokio::test]
async fn test_variants_agree_on_cards_and_names() {
    let (memory, graph) = both_variants().await;
    for card in 1..=57 {
        let card = CardId::new(card);
        let symbols = memory.symbols_on_card(card).await.unwrap();
        assert_eq!(symbols.len(), 8);
        assert!(symbols.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(graph.symbols_on_card(card).await.unwrap(), symbols);
    }
    let names = memory.all_symbol_names().await.unwrap();
    assert_eq!(names.len(), 57);
    assert_eq!(graph.all_symbol_names().await.unwrap(), names);
}

#[tokio::test]
async fn test_boundary_card_ids() {
    let (memory, graph) = both_variants().await;
    let stores: [&dyn IncidenceStore; 2] = [&memory, &graph];
    for store in stores {
        for bad in [0, 58] {
            assert!(
                matches!(
                    store.symbols_on_card(CardId::new(bad)).await,
                    Err(StoreError::NotFound { id, max: 57, .. }) if id == bad
                ),
                "{:?} card {bad}",
                store.mode()
            );
        }
        assert_eq!(store.symbols_on_card(CardId::new(1)).await.unwrap().len(), 8);
        assert_eq!(store.symbols_on_card(CardId::new(57)).await.unwrap().len(), 8);
        assert!(matches!(
            store.shared_symbol(CardId::new(5), CardId::new(5)).await,
            Err(StoreError::SameCard(_))
        ));
        assert!(matches!(
            store.shared_symbol(CardId::new(1), CardId::new(58)).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}

#[tokio::test]
async fn test_cards_one_and_two_share_music_notes_repeatedly() {
    for _ in 0..100 {
        let (memory, graph) = both_variants().await;
        for store in [&memory as &dyn IncidenceStore, &graph] {
            let shared = store
                .shared_symbol(CardId::new(1), CardId::new(2))
                .await
                .unwrap();
            assert_eq!(shared.id, PointId::new(50));
            assert_eq!(shared.name, "Music notes");
        }
    }
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let plane = plane();
    let graph = MemoryGraph::new();

    let first = seed_graph(&graph, &plane).await.unwrap();
    assert_eq!(first.outcome, SeedOutcome::JustLoaded);
    assert_eq!(
        first.counts,
        GraphCounts {
            points: 57,
            cards: 57,
            incidences: 456
        }
    );

    let second = seed_graph(&graph, &plane).await.unwrap();
    assert_eq!(second.outcome, SeedOutcome::AlreadyLoaded);
    assert_eq!(second.counts, first.counts);
    assert_eq!(graph.merge_calls(), 1);
}

#[tokio::test]
async fn test_partial_seed_is_fatal() {
    let plane = plane();
    let graph = Arc::new(MemoryGraph::new());
    seed_graph(graph.as_ref(), &plane).await.unwrap();
    graph.detach(PointId::new(1), CardId::new(2));

    let err = seed_graph(graph.as_ref(), &plane).await.unwrap_err();
    assert!(matches!(err, StoreError::InvariantViolation(_)), "{err}");

    let driver: Arc<dyn GraphDriver> = graph;
    let err = select_store(plane, Some(driver), &StoreConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvariantViolation(_)), "{err}");
}

#[tokio::test]
async fn test_seeding_a_different_order_is_rejected() {
    let graph = MemoryGraph::new();
    seed_graph(&graph, &build(3).unwrap()).await.unwrap();
    let err = seed_graph(&graph, &build(7).unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("expected 57 points"), "{err}");
}

/// The deck rows with every card id moved down by one, as a deck numbered
/// from zero would be written.
fn zero_based_rows(plane: &PlaneStructure) -> DeckRows {
    let mut rows = DeckRows::from_plane(plane);
    for card in &mut rows.cards {
        card.card_id = CardId::new(card.card_id.raw() - 1);
    }
    for edge in &mut rows.incidences {
        edge.card_id = CardId::new(edge.card_id.raw() - 1);
    }
    rows
}

#[tokio::test]
async fn test_foreign_deck_with_matching_counts_is_rejected() {
    let plane = plane();
    let graph = Arc::new(MemoryGraph::new());
    graph.merge_deck(&zero_based_rows(&plane)).await.unwrap();
    assert_eq!(graph.counts().await.unwrap(), GraphCounts::expected(&plane));

    let err = seed_graph(graph.as_ref(), &plane).await.unwrap_err();
    assert!(
        matches!(&err, StoreError::InvariantViolation(msg) if msg.contains("card 1")),
        "{err}"
    );

    let driver: Arc<dyn GraphDriver> = graph.clone();
    let err = select_store(plane, Some(driver), &StoreConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvariantViolation(_)), "{err}");
    assert_eq!(graph.merge_calls(), 1);
}

#[tokio::test]
async fn test_foreign_symbol_names_are_rejected() {
    let plane = plane();
    let graph = MemoryGraph::new();
    seed_graph(&graph, &plane).await.unwrap();
    graph.rename(PointId::new(50), "Treble clef");

    let err = seed_graph(&graph, &plane).await.unwrap_err();
    assert!(
        matches!(&err, StoreError::InvariantViolation(msg) if msg.contains("1 of 57 missing")),
        "{err}"
    );
}

#[tokio::test]
async fn test_missing_shared_symbol_reports_invariant_violation() {
    let plane = plane();
    let graph = Arc::new(MemoryGraph::new());
    seed_graph(graph.as_ref(), &plane).await.unwrap();
    let store = GraphBackedStore::new(graph.clone(), plane, Duration::from_secs(5));

    assert!(graph.detach(PointId::new(50), CardId::new(1)));
    let err = store
        .shared_symbol(CardId::new(1), CardId::new(2))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, StoreError::InvariantViolation(msg) if msg.contains("share 0 symbols")),
        "{err}"
    );
    // untouched pairs still answer
    assert_eq!(
        store
            .shared_symbol(CardId::new(2), CardId::new(3))
            .await
            .unwrap()
            .id,
        PointId::new(50)
    );
}

#[tokio::test]
async fn test_reachable_graph_selects_graph_mode() {
    let graph = Arc::new(MemoryGraph::new());
    let driver: Arc<dyn GraphDriver> = graph.clone();
    let active = select_store(plane(), Some(driver), &StoreConfig::default())
        .await
        .unwrap();

    assert_eq!(active.mode(), StoreMode::Graph);
    assert!(active.fallback_reason().is_none());
    assert_eq!(active.seed_report().unwrap().outcome, SeedOutcome::JustLoaded);
    assert_eq!(graph.merge_calls(), 1);

    // mode is fixed once chosen
    graph.set_online(false);
    assert_eq!(active.mode(), StoreMode::Graph);
    assert!(matches!(
        active.store().symbols_on_card(CardId::new(1)).await,
        Err(StoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_outage_selects_fallback_mode() {
    let graph = Arc::new(MemoryGraph::new());
    graph.set_online(false);
    let driver: Arc<dyn GraphDriver> = graph;
    let active = select_store(plane(), Some(driver), &StoreConfig::default())
        .await
        .unwrap();

    assert_eq!(active.mode(), StoreMode::Fallback);
    assert_eq!(active.health().mode, StoreMode::Fallback);
    assert!(active.fallback_reason().unwrap().contains("offline"));
    let shared = active
        .store()
        .shared_symbol(CardId::new(1), CardId::new(2))
        .await
        .unwrap();
    assert_eq!(shared.id, PointId::new(50));
}

#[tokio::test]
async fn test_unconfigured_graph_selects_fallback_mode() {
    let active = select_store(plane(), None, &StoreConfig::default())
        .await
        .unwrap();
    assert_eq!(active.mode(), StoreMode::Fallback);
    assert!(active.fallback_reason().unwrap().contains("NEO4J_PASSWORD"));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_driver_fails_closed() {
    let plane = plane();
    let graph = Arc::new(MemoryGraph::new().with_latency(Duration::from_secs(60)));
    let store = GraphBackedStore::new(graph, plane, Duration::from_millis(5_000));

    let err = store.symbols_on_card(CardId::new(3)).await.unwrap_err();
    assert!(
        matches!(&err, StoreError::Unavailable(msg) if msg.contains("timed out after 5000 ms")),
        "{err}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_stalled_probe_selects_fallback_mode() {
    let graph = Arc::new(MemoryGraph::new().with_latency(Duration::from_secs(60)));
    let driver: Arc<dyn GraphDriver> = graph;
    let active = select_store(plane(), Some(driver), &StoreConfig::default())
        .await
        .unwrap();
    assert_eq!(active.mode(), StoreMode::Fallback);
    assert!(active.fallback_reason().unwrap().contains("timed out"));
}

/// Answers like a seeded graph but claims two shared symbols for every pair.
struct DoubleSharing {
    plane: Arc<PlaneStructure>,
    calls: AtomicUsize,
}

#[async_trait]
impl GraphDriver for DoubleSharing {
    fn name(&self) -> &str {
        "double-sharing"
    }

    async fn ping(&self) -> fastmatch_store::Result<()> {
        Ok(())
    }

    async fn counts(&self) -> fastmatch_store::Result<GraphCounts> {
        Ok(GraphCounts::expected(&self.plane))
    }

    async fn merge_deck(&self, _deck: &DeckRows) -> fastmatch_store::Result<()> {
        Ok(())
    }

    async fn points_on_card(&self, card: CardId) -> fastmatch_store::Result<Vec<PointId>> {
        Ok(self.plane.points_on_line(card).unwrap_or_default().to_vec())
    }

    async fn shared_points(&self, a: CardId, b: CardId) -> fastmatch_store::Result<Vec<PointId>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut shared = self.plane.shared_points(a, b).unwrap_or_default();
        shared.push(PointId::new(1));
        shared.push(PointId::new(2));
        Ok(shared)
    }

    async fn symbol_names(&self) -> fastmatch_store::Result<Vec<String>> {
        Ok(self.plane.names().map(str::to_string).collect())
    }
}

#[tokio::test]
async fn test_corrupt_graph_reports_invariant_violation() {
    let plane = plane();
    let driver = Arc::new(DoubleSharing {
        plane: plane.clone(),
        calls: AtomicUsize::new(0),
    });
    let dyn_driver: Arc<dyn GraphDriver> = driver.clone();
    let active = select_store(plane, Some(dyn_driver), &StoreConfig::default())
        .await
        .unwrap();
    assert_eq!(active.mode(), StoreMode::Graph);
    assert_eq!(active.seed_report().unwrap().outcome, SeedOutcome::AlreadyLoaded);

    let err = active
        .store()
        .shared_symbol(CardId::new(10), CardId::new(20))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, StoreError::InvariantViolation(msg) if msg.contains("expected exactly 1")),
        "{err}"
    );
    assert_eq!(driver.calls.load(Ordering::SeqCst), 1);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_variants_agree_on_any_card_ids(a in 0u32..70, b in 0u32..70) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let (from_memory, from_graph) = rt.block_on(async {
            let (memory, graph) = both_variants().await;
            let (a, b) = (CardId::new(a), CardId::new(b));
            (memory.shared_symbol(a, b).await, graph.shared_symbol(a, b).await)
        });
        match (from_memory, from_graph) {
            (Ok(x), Ok(y)) => prop_assert_eq!(x, y),
            (Err(x), Err(y)) => prop_assert_eq!(x.to_string(), y.to_string()),
            mixed => prop_assert!(false, "variants disagree: {:?}", mixed),
        }
    }
}
