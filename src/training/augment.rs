//! Symmetry augmentation.
//!
//! For games whose rules are invariant under the 8 symmetries of the square,
//! each sample expands into all rotations and horizontal reflections, with
//! the board and the policy grid transformed jointly. Ineligible games (or
//! non-square boards) pass through untouched.

use crate::training::TrainingSample;

/// Counter-clockwise quarter turn of a flat `n x n` grid.
fn rot90<T: Copy>(grid: &[T], n: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(grid.len());
    for i in 0..n {
        for j in 0..n {
            out.push(grid[j * n + (n - 1 - i)]);
        }
    }
    out
}

/// Horizontal mirror of a flat `n x n` grid.
fn fliplr<T: Copy>(grid: &[T], n: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(grid.len());
    for i in 0..n {
        for j in 0..n {
            out.push(grid[i * n + (n - 1 - j)]);
        }
    }
    out
}

/// Expand a sample into its 8 symmetric variants, or return it unchanged
/// when the game is not eligible.
pub fn augment_sample(
    sample: &TrainingSample,
    shape: (usize, usize),
    eligible: bool,
) -> Vec<TrainingSample> {
    let (rows, cols) = shape;
    if !eligible || rows != cols {
        return vec![sample.clone()];
    }
    let n = rows;

    let mut variants = Vec::with_capacity(8);
    let mut board = sample.board.clone();
    let mut policy = sample.policy.clone();
    for _ in 0..4 {
        variants.push(TrainingSample {
            board: board.clone(),
            player: sample.player,
            policy: policy.clone(),
            value: sample.value,
        });
        variants.push(TrainingSample {
            board: fliplr(&board, n),
            player: sample.player,
            policy: fliplr(&policy, n),
            value: sample.value,
        });
        board = rot90(&board, n);
        policy = rot90(&policy, n);
    }
    variants
}
