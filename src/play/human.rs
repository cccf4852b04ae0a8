//! Human vs AI on the terminal.
//!
//! The human takes the `-1` pieces and moves first, entering moves as
//! `row col`. Malformed or illegal input re-prompts the same turn; the game
//! state is never touched by a rejected move.

use std::io::BufRead;

use rand::Rng;

use crate::config::Config;
use crate::game::{Game, OthelloGame};
use crate::mcts::{Mcts, SearchConfig, SearchNode};
use crate::neural::NetworkManager;
use crate::{Error, Result};

const HUMAN: i8 = -1;

pub fn run<R: Rng>(config: &Config, rng: &mut R) -> Result<()> {
    let mut manager = NetworkManager::new(config)?;
    manager.load_checkpoint("best_model")?;
    let mcts = Mcts::new(&manager, SearchConfig::from_config(config, false));

    let mut game = OthelloGame::new();
    let mut root = SearchNode::new_root();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    println!("You play O and move first. Enter moves as: row col");
    loop {
        println!("{}", game);
        let (over, value) = game.check_game_over(HUMAN);
        if over {
            match value {
                1 => println!("You win!"),
                -1 => println!("The AI wins."),
                _ => println!("Draw."),
            }
            return Ok(());
        }

        let action = if game.current_player() == HUMAN {
            read_move(&mut lines, &game)?
        } else {
            let found = mcts.search(&game, &mut root, config.temp_final, rng)?;
            println!("AI plays {} {}", found.action / 8, found.action % 8);
            found.action
        };
        game.apply_move(action)?;
        root = root.reroot(action);
    }
}

/// Prompt until the human supplies a legal move.
fn read_move<B, I>(lines: &mut I, game: &OthelloGame) -> Result<usize>
where
    B: std::ops::Deref<Target = str>,
    I: Iterator<Item = std::io::Result<B>>,
{
    let legal = game.legal_moves(game.current_player());
    loop {
        println!("Your move (row col):");
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(Error::Format("input closed".to_string())),
        };
        match parse_move(&line) {
            Ok(action) if legal.contains(&action) => return Ok(action),
            Ok(action) => {
                println!("({}, {}) is not a legal move.", action / 8, action % 8);
            }
            Err(e) => println!("{}", e),
        }
    }
}

/// Parse `row col` into an action index.
fn parse_move(input: &str) -> Result<usize> {
    let mut parts = input.split_whitespace();
    let (row, col) = match (parts.next(), parts.next(), parts.next()) {
        (Some(row), Some(col), None) => (row, col),
        _ => {
            return Err(Error::Format(format!(
                "expected two numbers, got {:?}",
                input.trim()
            )))
        }
    };
    let row: usize = row
        .parse()
        .map_err(|_| Error::Format(format!("bad row {:?}", row)))?;
    let col: usize = col
        .parse()
        .map_err(|_| Error::Format(format!("bad column {:?}", col)))?;
    if row >= 8 || col >= 8 {
        return Err(Error::Format(format!("({}, {}) is off the board", row, col)));
    }
    Ok(row * 8 + col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_row_col() {
        assert_eq!(parse_move("2 4").unwrap(), 20);
        assert_eq!(parse_move("  7 0 ").unwrap(), 56);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_matches!(parse_move(""), Err(Error::Format(_)));
        assert_matches!(parse_move("3"), Err(Error::Format(_)));
        assert_matches!(parse_move("a b"), Err(Error::Format(_)));
        assert_matches!(parse_move("1 2 3"), Err(Error::Format(_)));
        assert_matches!(parse_move("8 0"), Err(Error::Format(_)));
    }

    #[test]
    fn reprompts_until_a_legal_move() {
        let game = OthelloGame::new();
        let inputs = ["garbage", "0 0", "2 4"];
        let mut lines = inputs.iter().copied().map(Ok::<&str, std::io::Error>);
        let action = read_move(&mut lines, &game).unwrap();
        assert_eq!(action, 20);
    }

    #[test]
    fn exhausted_input_is_an_error() {
        let game = OthelloGame::new();
        let mut lines = std::iter::empty::<std::io::Result<&str>>();
        assert_matches!(read_move(&mut lines, &game), Err(Error::Format(_)));
    }
}
