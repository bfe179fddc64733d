//! Fastmatch CLI
//!
//! Command-line front end for the deck:
//! - Building and auditing the projective plane behind the cards
//! - Seeding a Neo4j graph with the deck
//! - Running store queries (card contents, shared symbols, health)
//! - Dealing and judging a round from the terminal

use anyhow::Result;
use clap::{Parser, Subcommand};
use fastmatch_plane::DEFAULT_ORDER;

mod commands;
mod output;
mod store;

use store::{GraphMode, StoreArgs};

#[derive(Parser)]
#[command(name = "fastmatch")]
#[command(author, version, about = "Fastmatch: a projective-plane card deck")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the plane the deck is built from
    Plane {
        #[command(subcommand)]
        command: PlaneCommands,
    },

    /// Graph database maintenance
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },

    /// Symbols on a card
    Card {
        /// Card id (1-57)
        id: u32,
    },

    /// The symbol two cards share
    Shared {
        a: u32,
        b: u32,
    },

    /// Every symbol name in the deck
    Names,

    /// Which store is serving queries, and why
    Health,

    /// Deal a round and optionally judge an answer
    Round {
        /// Seed for a reproducible deal
        #[arg(long)]
        seed: Option<u64>,

        /// Answer to judge, by symbol name or id
        #[arg(long)]
        answer: Option<String>,

        /// Whose card the answer is for
        #[arg(long, default_value = "human")]
        role: fastmatch_game::Role,
    },
}

#[derive(Subcommand)]
enum PlaneCommands {
    /// Build the plane and audit every incidence invariant
    Verify {
        /// Plane order (prime)
        #[arg(long, default_value_t = DEFAULT_ORDER)]
        order: u32,
    },

    /// List cards with their symbols
    Show {
        /// Only this card
        #[arg(long)]
        card: Option<u32>,
    },
}

#[derive(Subcommand)]
enum GraphCommands {
    /// Load the deck into the configured graph unless it is already there
    Seed,
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json = cli.json;

    match cli.command {
        Commands::Plane { command } => match command {
            PlaneCommands::Verify { order } => commands::cmd_plane_verify(order, json),
            PlaneCommands::Show { card } => commands::cmd_plane_show(card, json),
        },
        Commands::Graph { command } => match command {
            GraphCommands::Seed => commands::cmd_graph_seed(&cli.store, json).await,
        },
        Commands::Card { id } => commands::cmd_card(&cli.store, id, json).await,
        Commands::Shared { a, b } => commands::cmd_shared(&cli.store, a, b, json).await,
        Commands::Names => commands::cmd_names(&cli.store, json).await,
        Commands::Health => commands::cmd_health(&cli.store, json).await,
        Commands::Round { seed, answer, role } => {
            commands::cmd_round(&cli.store, seed, answer.as_deref(), role, json).await
        }
    }
}
