//! Monte Carlo Tree Search guided by a policy/value predictor.

pub mod node;
pub mod search;

pub use node::SearchNode;
pub use search::{Mcts, SearchConfig, SearchOutcome, DETERMINISTIC_TEMP};

use crate::game::Game;

/// Policy/value oracle the search consults at leaf expansion.
///
/// `predict` returns a probability distribution over the full action space
/// (illegal entries are masked out by the engine) and a scalar value in
/// `[-1, 1]` from the perspective of the player to move in `state`.
pub trait Predictor<G: Game> {
    fn predict(&self, state: &G) -> crate::Result<(Vec<f32>, f32)>;
}
