//! Deal and print a single baccarat coup.
//!
//! Usage:
//!   cargo run --bin deal -- [--decks N] [--seed N]

use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use betsim::games::baccarat::{Coup, Hand, Shoe};

#[derive(Debug, Parser)]
#[command(name = "deal", version, about = "Deal one baccarat coup from a fresh shoe")]
struct Cli {
    /// Decks in the shoe
    #[arg(long, default_value_t = 8)]
    decks: u32,

    /// Shuffle seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shoe = Shoe::shuffled(cli.decks, &mut rng);
    debug!(seed, decks = cli.decks, cards = shoe.size(), "shoe ready");

    match Coup::deal(&mut shoe) {
        Ok(coup) => {
            println!("Player's hand: {} (value: {})", cards(&coup.player), coup.player_value());
            println!("Banker's hand: {} (value: {})", cards(&coup.banker), coup.banker_value());
            println!("Winner: {}", coup.winner());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cards(hand: &Hand) -> String {
    hand.cards()
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
