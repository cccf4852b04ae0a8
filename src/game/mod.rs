//! Game rules behind a capability interface.
//!
//! The search engine and the training pipeline only ever talk to a game
//! through [`Game`], so a new board game plugs in by implementing the trait.

pub mod othello;

pub use othello::OthelloGame;

/// Capability interface a board game must provide to the pipeline.
///
/// Players are `+1` and `-1`. Actions are indices into a flat action space
/// of size `action_size()`. Cloning must produce an independent deep copy:
/// the search engine clones the state once per simulation and mutates the
/// copy freely.
pub trait Game: Clone {
    /// Player whose turn it is.
    fn current_player(&self) -> i8;

    /// Size of the flat action space.
    fn action_size(&self) -> usize;

    /// Board dimensions as `(rows, cols)`.
    fn board_shape(&self) -> (usize, usize);

    /// Row-major snapshot of the board, cells in `{-1, 0, +1}`.
    fn board(&self) -> Vec<i8>;

    /// Legal actions for `player`, in stable ascending (row-major) order.
    fn legal_moves(&self, player: i8) -> Vec<usize>;

    /// Apply `action` for the current player and advance the turn.
    ///
    /// On an illegal action the state is left untouched and an error is
    /// returned.
    fn apply_move(&mut self, action: usize) -> crate::Result<()>;

    /// `(terminal, value)` where `value` is `+1` if `perspective` won,
    /// `-1` if it lost, `0` for a draw or a non-terminal state.
    fn check_game_over(&self, perspective: i8) -> (bool, i8);

    /// Whether positions and policies may be augmented with the 8 square
    /// symmetries (rotations and reflections).
    fn symmetry_eligible(&self) -> bool;
}
