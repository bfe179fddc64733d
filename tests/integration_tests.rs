//! End-to-end tests across the plane, store and game crates.

use fastmatch_game::{judge, select_round, Claim, Role, RoundView};
use fastmatch_plane::{build, CardId, PointId, DEFAULT_ORDER};
use fastmatch_store::{
    select_store, ActiveStore, GraphDriver, IncidenceStore, MemoryGraph, StoreConfig, StoreMode,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

async fn start(graph: Option<Arc<MemoryGraph>>) -> ActiveStore {
    let plane = Arc::new(build(DEFAULT_ORDER).unwrap());
    let driver = graph.map(|g| g as Arc<dyn GraphDriver>);
    select_store(plane, driver, &StoreConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_game_against_graph_and_fallback() {
    let graph_active = start(Some(Arc::new(MemoryGraph::new()))).await;
    let fallback_active = start(None).await;
    assert_eq!(graph_active.mode(), StoreMode::Graph);
    assert_eq!(fallback_active.mode(), StoreMode::Fallback);

    let graph = graph_active.store();
    let memory = fallback_active.store();

    let mut rng = StdRng::seed_from_u64(57);
    for _ in 0..50 {
        let round = select_round(&mut rng, graph.card_count()).unwrap();
        let view = RoundView::load(graph.as_ref(), round).await.unwrap();
        assert_eq!(view, RoundView::load(memory.as_ref(), round).await.unwrap());

        for role in [Role::Human, Role::Ai] {
            let on_graph = judge(graph.as_ref(), &round, role, &Claim::default())
                .await
                .unwrap();
            let in_memory = judge(memory.as_ref(), &round, role, &Claim::default())
                .await
                .unwrap();
            assert_eq!(on_graph.expected, in_memory.expected);

            let by_id = Claim::by_id(on_graph.expected.id);
            assert!(judge(memory.as_ref(), &round, role, &by_id).await.unwrap().correct);
        }
    }
}

#[tokio::test]
async fn test_outage_after_startup_is_not_masked() {
    let graph = Arc::new(MemoryGraph::new());
    let active = start(Some(graph.clone())).await;
    graph.set_online(false);

    let round = fastmatch_game::Round::new(CardId::new(1), CardId::new(2), CardId::new(3)).unwrap();
    let err = judge(active.store().as_ref(), &round, Role::Ai, &Claim::by_id(PointId::new(50)))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unavailable"), "{err}");
    assert_eq!(active.mode(), StoreMode::Graph);
}

#[tokio::test]
async fn test_second_process_finds_the_deck_loaded() {
    let graph = Arc::new(MemoryGraph::new());
    let first = start(Some(graph.clone())).await;
    let second = start(Some(graph.clone())).await;

    assert_eq!(
        first.seed_report().map(|r| r.outcome),
        Some(fastmatch_store::SeedOutcome::JustLoaded)
    );
    assert_eq!(
        second.seed_report().map(|r| r.outcome),
        Some(fastmatch_store::SeedOutcome::AlreadyLoaded)
    );
    assert_eq!(graph.merge_calls(), 1);

    let shared = second
        .store()
        .shared_symbol(CardId::new(1), CardId::new(2))
        .await
        .unwrap();
    assert_eq!(shared.name, "Music notes");
}
