//! Command-line interface for matchbox.

use clap::{Parser, Subcommand};
use matchbox_rules::{Board, Mark, Variant};
use std::path::PathBuf;

/// Matchbox - grid games, a minimax opponent and a matchmaking lobby
#[derive(Parser, Debug)]
#[command(name = "matchbox")]
#[command(
    about = "Rules engine and lobby for classic, erase and experimental grid games",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Lobby config file (TOML). Falls back to MATCHBOX_CONFIG, then defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the search for the best cell on a 3×3 board
    BestMove {
        /// Nine cells in row-major order: X, O, and space or '.' for empty
        #[arg(short, long)]
        board: Board,

        /// Mark to move
        #[arg(short, long, default_value = "o", value_parser = parse_mark)]
        mark: Mark,
    },

    /// Let the search play both sides of a Classic game
    SelfPlay,

    /// Print the effective lobby configuration as JSON
    ShowConfig,

    /// Walk two participants through matchmaking and a full match
    Demo {
        /// Variant to queue for
        #[arg(short, long, default_value = "classic")]
        variant: Variant,
    },
}

fn parse_mark(value: &str) -> Result<Mark, String> {
    match value {
        "x" | "X" => Ok(Mark::X),
        "o" | "O" => Ok(Mark::O),
        other => Err(format!("expected x or o, got {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_best_move() {
        let args = ["matchbox", "best-move", "--board", "XX.OO....", "--mark", "x"];
        let cli = Cli::try_parse_from(args).expect("valid arguments");
        let Command::BestMove { board, mark } = cli.command else {
            panic!("expected best-move");
        };
        assert_eq!(mark, Mark::X);
        assert_eq!(board.mark_at(0), Some(Mark::X));
        assert!(board.is_vacant(2));
    }

    #[test]
    fn test_parse_demo_variant() {
        let args = ["matchbox", "demo", "--variant", "Erase", "-c", "lobby.toml"];
        let cli = Cli::try_parse_from(args).expect("valid arguments");
        assert!(matches!(cli.command, Command::Demo { variant: Variant::Erase }));
        assert_eq!(cli.config, Some(PathBuf::from("lobby.toml")));
    }

    #[test]
    fn test_rejects_bad_mark() {
        let args = ["matchbox", "best-move", "--board", ".........", "--mark", "z"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
