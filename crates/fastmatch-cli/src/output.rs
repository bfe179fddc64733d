//! Text rendering for terminal output.

use colored::Colorize;
use fastmatch_plane::{emoji_for_name, AuditReport, Point};
use serde::Serialize;

/// `🎵 Music notes (#50)`, with a blank glyph for names outside the catalog.
pub fn symbol(point: &Point) -> String {
    let glyph = emoji_for_name(&point.name).unwrap_or("·");
    format!("{glyph} {} (#{})", point.name, point.id)
}

/// One line per symbol, indented.
pub fn symbol_list(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("  {}", symbol(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn card_heading(card: impl std::fmt::Display, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{} {}", format!("Card {card}").bold(), format!("[{label}]").dimmed()),
        None => format!("Card {card}").bold().to_string(),
    }
}

pub fn audit(report: &AuditReport) -> String {
    [
        format!("{} plane of order {}", "ok".green().bold(), report.order),
        format!("  points      {}", report.points),
        format!("  lines       {}", report.lines),
        format!("  degree      {}", report.degree),
        format!("  line pairs  {} (each share exactly one point)", report.line_pairs),
        format!("  point pairs {} (each on exactly one line)", report.point_pairs),
    ]
    .join("\n")
}

pub fn verdict_word(correct: bool) -> String {
    if correct {
        "correct".green().bold().to_string()
    } else {
        "wrong".red().bold().to_string()
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
