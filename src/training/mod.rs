//! Self-play, augmentation, evaluation and the outer training loop.

pub mod augment;
pub mod evaluator;
pub mod selfplay;
pub mod session;

pub use evaluator::{Evaluator, MatchStats};
pub use selfplay::SelfPlayDriver;
pub use session::TrainingSession;

/// One training example produced by self-play.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    /// Row-major board snapshot before the move, cells in `{-1, 0, +1}`.
    pub board: Vec<i8>,
    /// Player who was to move.
    pub player: i8,
    /// Normalized visit-count distribution over the full action space.
    pub policy: Vec<f32>,
    /// Final game outcome from `player`'s perspective, filled in once the
    /// game terminates.
    pub value: f32,
}
