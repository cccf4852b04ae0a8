//! Othello (Reversi) on an 8×8 board.
//!
//! Cells hold `-1`, `0` or `+1`. `-1` opens the game. An action is the
//! row-major cell index `row * 8 + col`. The game ends as soon as either
//! player has no legal move, so the player to move in a non-terminal state
//! always has at least one legal action.

use std::fmt;

use crate::game::Game;
use crate::{Error, Result};

const SIZE: usize = 8;

const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone)]
pub struct OthelloGame {
    cells: [[i8; SIZE]; SIZE],
    current_player: i8,
}

impl Default for OthelloGame {
    fn default() -> Self {
        Self::new()
    }
}

impl OthelloGame {
    /// Standard opening position, `-1` to move.
    pub fn new() -> Self {
        let mut cells = [[0i8; SIZE]; SIZE];
        cells[3][3] = -1;
        cells[4][4] = -1;
        cells[3][4] = 1;
        cells[4][3] = 1;
        Self {
            cells,
            current_player: -1,
        }
    }

    fn in_bounds(row: isize, col: isize) -> bool {
        (0..SIZE as isize).contains(&row) && (0..SIZE as isize).contains(&col)
    }

    /// Cells flipped by `player` placing at `(row, col)`, across all eight
    /// directions. Empty when the placement is illegal.
    fn captures(&self, row: usize, col: usize, player: i8) -> Vec<(usize, usize)> {
        let mut flips = Vec::new();
        if self.cells[row][col] != 0 {
            return flips;
        }
        for &(dr, dc) in &DIRECTIONS {
            let mut r = row as isize + dr;
            let mut c = col as isize + dc;
            let mut line = Vec::new();
            while Self::in_bounds(r, c) && self.cells[r as usize][c as usize] == -player {
                line.push((r as usize, c as usize));
                r += dr;
                c += dc;
            }
            if !line.is_empty()
                && Self::in_bounds(r, c)
                && self.cells[r as usize][c as usize] == player
            {
                flips.extend(line);
            }
        }
        flips
    }

    fn has_legal_move(&self, player: i8) -> bool {
        for row in 0..SIZE {
            for col in 0..SIZE {
                if !self.captures(row, col, player).is_empty() {
                    return true;
                }
            }
        }
        false
    }

    fn piece_count(&self, player: i8) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == player)
            .count()
    }
}

impl Game for OthelloGame {
    fn current_player(&self) -> i8 {
        self.current_player
    }

    fn action_size(&self) -> usize {
        SIZE * SIZE
    }

    fn board_shape(&self) -> (usize, usize) {
        (SIZE, SIZE)
    }

    fn board(&self) -> Vec<i8> {
        self.cells.iter().flatten().copied().collect()
    }

    fn legal_moves(&self, player: i8) -> Vec<usize> {
        let mut moves = Vec::new();
        for row in 0..SIZE {
            for col in 0..SIZE {
                if !self.captures(row, col, player).is_empty() {
                    moves.push(row * SIZE + col);
                }
            }
        }
        moves
    }

    fn apply_move(&mut self, action: usize) -> Result<()> {
        if action >= SIZE * SIZE {
            return Err(Error::InvalidMove(format!(
                "action {} out of range",
                action
            )));
        }
        let (row, col) = (action / SIZE, action % SIZE);
        let flips = self.captures(row, col, self.current_player);
        if flips.is_empty() {
            return Err(Error::InvalidMove(format!(
                "({}, {}) captures nothing for player {}",
                row, col, self.current_player
            )));
        }
        self.cells[row][col] = self.current_player;
        for (r, c) in flips {
            self.cells[r][c] = self.current_player;
        }
        self.current_player = -self.current_player;
        Ok(())
    }

    fn check_game_over(&self, perspective: i8) -> (bool, i8) {
        if self.has_legal_move(1) && self.has_legal_move(-1) {
            return (false, 0);
        }
        let own = self.piece_count(perspective);
        let opponent = self.piece_count(-perspective);
        let value = match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
        };
        (true, value)
    }

    fn symmetry_eligible(&self) -> bool {
        // The mover-dependent value of edge and corner squares makes naive
        // rotation/reflection of recorded policies unsound here.
        false
    }
}

impl fmt::Display for OthelloGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  0 1 2 3 4 5 6 7")?;
        for (row, cells) in self.cells.iter().enumerate() {
            write!(f, "{} ", row)?;
            for (col, &cell) in cells.iter().enumerate() {
                let glyph = match cell {
                    1 => 'X',
                    -1 => 'O',
                    _ => '.',
                };
                write!(f, "{}", glyph)?;
                if col < SIZE - 1 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
