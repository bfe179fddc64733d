//! Command handlers.

use crate::output;
use crate::store::{deck, StoreArgs};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use fastmatch_game::{judge, select_round, Claim, Role, RoundView};
use fastmatch_plane::{CardId, PlaneBuilder};
use fastmatch_store::{seed_graph, StoreMode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

pub fn cmd_plane_verify(order: u32, json: bool) -> Result<()> {
    let plane = PlaneBuilder::new(order)
        .build()
        .with_context(|| format!("building the plane of order {order}"))?;
    let report = plane.verify().context("auditing the plane")?;
    if json {
        return output::print_json(&json!({ "summary": plane.summary(), "audit": report }));
    }
    println!("{}", output::audit(&report));
    println!("  incidences  {}", plane.incidence_count());
    Ok(())
}

pub fn cmd_plane_show(card: Option<u32>, json: bool) -> Result<()> {
    let plane = deck()?;
    let cards: Vec<CardId> = match card {
        Some(raw) => {
            let id = CardId::new(raw);
            if !plane.contains_card(id) {
                bail!("card {raw} not found (valid ids are 1..={})", plane.len());
            }
            vec![id]
        }
        None => plane.card_ids().collect(),
    };

    if json {
        let rows: Vec<_> = cards
            .iter()
            .filter_map(|id| {
                let line = plane.line(*id)?;
                let symbols: Vec<_> = line.points.iter().filter_map(|p| plane.point(*p)).collect();
                Some(json!({
                    "cardId": id,
                    "label": plane.describe_line(*id),
                    "symbols": symbols,
                }))
            })
            .collect();
        return output::print_json(&rows);
    }

    for id in cards {
        let label = plane.describe_line(id);
        println!("{}", output::card_heading(id, label.as_deref()));
        let symbols: Vec<_> = plane
            .points_on_line(id)
            .unwrap_or_default()
            .iter()
            .filter_map(|p| plane.point(*p).cloned())
            .collect();
        println!("{}", output::symbol_list(&symbols));
    }
    Ok(())
}

pub async fn cmd_graph_seed(args: &StoreArgs, json: bool) -> Result<()> {
    let plane = deck()?;
    let config = args.config()?;
    let driver = args.require_driver(&config)?;
    let report = tokio::time::timeout(config.seed_timeout(), seed_graph(driver.as_ref(), &plane))
        .await
        .with_context(|| format!("seeding timed out after {} ms", config.seed_timeout_ms))?
        .with_context(|| format!("seeding the {} graph", driver.name()))?;

    tracing::info!(driver = driver.name(), outcome = %report.outcome, counts = %report.counts, "graph seed finished");

    if json {
        return output::print_json(&report);
    }
    println!(
        "{} {} graph {} ({})",
        "ok".green().bold(),
        driver.name(),
        report.outcome,
        report.counts
    );
    Ok(())
}

pub async fn cmd_card(args: &StoreArgs, id: u32, json: bool) -> Result<()> {
    let (plane, active) = args.open().await?;
    let card = CardId::new(id);
    let symbols = active
        .store()
        .symbols_on_card(card)
        .await
        .with_context(|| format!("looking up card {id}"))?;

    if json {
        return output::print_json(&json!({ "cardId": card, "symbols": symbols }));
    }
    let label = plane.describe_line(card);
    println!("{}", output::card_heading(card, label.as_deref()));
    println!("{}", output::symbol_list(&symbols));
    Ok(())
}

pub async fn cmd_shared(args: &StoreArgs, a: u32, b: u32, json: bool) -> Result<()> {
    let (_, active) = args.open().await?;
    let shared = active
        .store()
        .shared_symbol(CardId::new(a), CardId::new(b))
        .await
        .with_context(|| format!("finding the symbol cards {a} and {b} share"))?;

    if json {
        return output::print_json(&shared);
    }
    println!("Cards {a} and {b} share {}", output::symbol(&shared).bold());
    Ok(())
}

pub async fn cmd_names(args: &StoreArgs, json: bool) -> Result<()> {
    let (_, active) = args.open().await?;
    let names = active
        .store()
        .all_symbol_names()
        .await
        .context("listing symbol names")?;

    if json {
        return output::print_json(&names);
    }
    for name in &names {
        println!("{name}");
    }
    Ok(())
}

pub async fn cmd_health(args: &StoreArgs, json: bool) -> Result<()> {
    let (_, active) = args.open().await?;
    let health = active.health();
    tracing::debug!(?active, "store health");

    if json {
        return output::print_json(&json!({
            "mode": health.mode,
            "fallbackReason": active.fallback_reason(),
            "seed": active.seed_report(),
        }));
    }
    let mode = match health.mode {
        StoreMode::Graph => health.mode.to_string().green().bold(),
        StoreMode::Fallback => health.mode.to_string().yellow().bold(),
    };
    println!("mode: {mode}");
    if let Some(reason) = active.fallback_reason() {
        println!("reason: {reason}");
    }
    if let Some(seed) = active.seed_report() {
        println!("graph: {} ({})", seed.outcome, seed.counts);
    }
    Ok(())
}

pub async fn cmd_round(
    args: &StoreArgs,
    seed: Option<u64>,
    answer: Option<&str>,
    role: Role,
    json: bool,
) -> Result<()> {
    let (_, active) = args.open().await?;
    let store = active.store();

    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let round = select_round(&mut rng, store.card_count())?;
    tracing::debug!(seed, mode = %active.mode(), ?round, "dealt round");
    let view = RoundView::load(store.as_ref(), round)
        .await
        .context("loading the round's cards")?;

    let verdict = match answer {
        Some(answer) => {
            let claim = Claim::parse(answer);
            if claim.is_empty() {
                bail!("--answer is blank");
            }
            let verdict = judge(store.as_ref(), &round, role, &claim)
                .await
                .context("judging the answer")?;
            tracing::info!(%role, correct = verdict.correct, expected = %verdict.expected.id, "judged answer");
            Some(verdict)
        }
        None => None,
    };

    if json {
        return output::print_json(&json!({
            "seed": seed,
            "round": round,
            "cards": {
                "target": view.target,
                "ai": view.ai,
                "human": view.human,
            },
            "role": role,
            "verdict": verdict,
        }));
    }

    for (title, card, symbols) in [
        ("Target", round.target, &view.target),
        ("AI", round.ai, &view.ai),
        ("Yours", round.human, &view.human),
    ] {
        println!("{} {}", format!("{title}:").bold(), output::card_heading(card, None));
        println!("{}", output::symbol_list(symbols));
    }

    match verdict {
        Some(verdict) => println!(
            "{} answer for the {role} card is {} (shared symbol: {})",
            answer.unwrap_or_default(),
            output::verdict_word(verdict.correct),
            output::symbol(&verdict.expected)
        ),
        None => println!(
            "Which symbol does your card share with the target? Answer with: fastmatch round --seed {seed} --answer <NAME>"
        ),
    }
    Ok(())
}
