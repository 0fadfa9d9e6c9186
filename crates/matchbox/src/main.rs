//! Matchbox - command-line harness
//!
//! Queries the search, plays it against itself, and walks a scripted pair
//! of participants through the lobby.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use matchbox_lobby::{Lobby, LobbyConfig, Matchmaking};
use matchbox_rules::{Board, Mark, Outcome, Variant, best_move_for, evaluate};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Moves after which the demo gives up on an Erase match that keeps cycling.
const DEMO_MOVE_LIMIT: usize = 60;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Command::BestMove { board, mark } => run_best_move(&board, mark),
        Command::SelfPlay => run_self_play(),
        Command::ShowConfig => show_config(&config),
        Command::Demo { variant } => run_demo(config, variant),
    }
}

/// Resolves the config path from the flag or `MATCHBOX_CONFIG`.
#[instrument]
fn load_config(flag: Option<PathBuf>) -> Result<LobbyConfig> {
    let path = flag.or_else(|| std::env::var_os("MATCHBOX_CONFIG").map(PathBuf::from));
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading lobby config");
            LobbyConfig::from_file(&path)
                .with_context(|| format!("loading {}", path.display()))
        }
        None => {
            debug!("No config file given, using defaults");
            Ok(LobbyConfig::default())
        }
    }
}

#[instrument(skip(board))]
fn run_best_move(board: &Board, mark: Mark) -> Result<()> {
    if board.len() != Variant::Classic.cell_count() {
        bail!("the search plays 3×3 boards only, got {} cells", board.len());
    }
    let status = evaluate(board);
    if status.is_terminal() {
        warn!(%status, "Board is already decided");
    }

    println!("{}\n", board);
    match best_move_for(board, mark) {
        Some(found) => println!(
            "best cell for {}: {} (score {}, {} positions)",
            mark.side(),
            found.index,
            found.score,
            found.nodes
        ),
        None => println!("no empty cell"),
    }
    Ok(())
}

#[instrument]
fn run_self_play() -> Result<()> {
    let mut board = Board::classic();
    let mut mover = Mark::X;

    while evaluate(&board) == Outcome::InProgress {
        let found = best_move_for(&board, mover).context("search found no move")?;
        board.place(found.index, mover)?;
        println!("{} plays {} (score {})\n{}\n", mover.side(), found.index, found.score, board);
        mover = mover.opponent();
    }

    let status = evaluate(&board);
    info!(%status, "Self-play finished");
    println!("result: {}", status);
    Ok(())
}

fn show_config(config: &LobbyConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[instrument(skip(config))]
fn run_demo(config: LobbyConfig, variant: Variant) -> Result<()> {
    let lobby = Lobby::new(config);

    if let Matchmaking::Matched(_) = lobby.enqueue_or_match(variant, "alice")? {
        bail!("alice should have waited for a partner");
    }
    let Matchmaking::Matched(mut game) = lobby.enqueue_or_match(variant, "bob")? else {
        bail!("bob should have been paired with alice");
    };
    let id = game.id().clone();
    println!("{} paired {} (x) with {} (o)\n", id, game.players()[0], game.players()[1]);

    let mut moves = 0;
    while *game.status() == Outcome::InProgress && moves < DEMO_MOVE_LIMIT {
        let mover = game.current_participant().clone();
        let Some(mark) = game.mark_of(&mover) else {
            bail!("{} is not seated in {}", mover, id);
        };
        let cell = if variant == Variant::Experimental {
            game.board().vacant_cells().next()
        } else {
            best_move_for(game.board(), mark).map(|found| found.index)
        };
        let Some(cell) = cell else {
            println!("no empty cell left");
            break;
        };

        game = lobby.submit_move(&id, &mover, cell)?;
        moves += 1;
        println!("{} plays {}\n{}\n", mover, cell, game.board());
    }

    for participant in game.players() {
        let view = lobby.view(&id, participant)?;
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    lobby.leave(&id, "alice")?;
    info!(match_id = %id, moves, "Demo finished");
    Ok(())
}
