//! Self-play game generation.
//!
//! One driver plays full games against itself with exploration noise on,
//! recording a sample per ply. Outcomes are assigned once the game ends:
//! the terminal value is expressed from the perspective of the player to
//! move at the terminal state, so walking the samples backwards flips the
//! sign at every step.

use rand::Rng;

use crate::config::Config;
use crate::game::Game;
use crate::mcts::{Mcts, Predictor, SearchConfig, SearchNode};
use crate::training::TrainingSample;
use crate::Result;

pub struct SelfPlayDriver<'a, P> {
    mcts: Mcts<'a, P>,
    temp_init: f64,
    temp_final: f64,
    temp_thresh: usize,
}

impl<'a, P> SelfPlayDriver<'a, P> {
    pub fn new(predictor: &'a P, config: &Config) -> Self {
        Self {
            mcts: Mcts::new(predictor, SearchConfig::from_config(config, true)),
            temp_init: config.temp_init,
            temp_final: config.temp_final,
            temp_thresh: config.temp_thresh,
        }
    }

    /// Play one game to termination and return its samples, outcomes
    /// assigned. The search tree is reused across plies via rerooting.
    pub fn play_game<G, R>(&self, mut state: G, rng: &mut R) -> Result<Vec<TrainingSample>>
    where
        G: Game,
        P: Predictor<G>,
        R: Rng,
    {
        let mut samples = Vec::new();
        let mut root = SearchNode::new_root();

        loop {
            let (terminal, outcome) = state.check_game_over(state.current_player());
            if terminal {
                assign_outcomes(&mut samples, outcome);
                log::debug!(
                    "self-play game over after {} plies, terminal value {}",
                    samples.len(),
                    outcome
                );
                return Ok(samples);
            }

            let temperature = if samples.len() < self.temp_thresh {
                self.temp_init
            } else {
                self.temp_final
            };
            let found = self.mcts.search(&state, &mut root, temperature, rng)?;

            samples.push(TrainingSample {
                board: state.board(),
                player: state.current_player(),
                policy: found.policy,
                value: 0.0,
            });

            state.apply_move(found.action)?;
            root = root.reroot(found.action);
        }
    }
}

/// Fill in sample values from the terminal outcome.
///
/// `terminal_value` is from the perspective of the player to move at the
/// terminal state. Each ply back from there flips the perspective, so the
/// last recorded sample gets the negated value.
pub(crate) fn assign_outcomes(samples: &mut [TrainingSample], terminal_value: i8) {
    let mut value = f32::from(terminal_value);
    for sample in samples.iter_mut().rev() {
        value = -value;
        sample.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::OthelloGame;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn blank_sample() -> TrainingSample {
        TrainingSample {
            board: vec![0; 64],
            player: 0,
            policy: vec![0.0; 64],
            value: 0.0,
        }
    }

    #[test]
    fn outcomes_alternate_backwards_from_terminal() {
        let mut samples = vec![blank_sample(), blank_sample(), blank_sample()];
        assign_outcomes(&mut samples, 1);
        // Last mover before the terminal state sees the negated value, and
        // the sign alternates towards the start of the game.
        assert_eq!(samples[2].value, -1.0);
        assert_eq!(samples[1].value, 1.0);
        assert_eq!(samples[0].value, -1.0);
    }

    #[test]
    fn draw_propagates_zero_everywhere() {
        let mut samples = vec![blank_sample(), blank_sample()];
        assign_outcomes(&mut samples, 0);
        assert!(samples.iter().all(|s| s.value == 0.0));
    }

    struct FlatPredictor;

    impl Predictor<OthelloGame> for FlatPredictor {
        fn predict(&self, state: &OthelloGame) -> crate::Result<(Vec<f32>, f32)> {
            let n = state.action_size();
            Ok((vec![1.0 / n as f32; n], 0.0))
        }
    }

    #[test]
    fn full_game_produces_consistent_samples() {
        let predictor = FlatPredictor;
        let config = Config {
            num_mcts_sims: 8,
            ..Config::default()
        };
        let driver = SelfPlayDriver::new(&predictor, &config);
        let mut rng = StdRng::seed_from_u64(21);

        let samples = driver.play_game(OthelloGame::new(), &mut rng).unwrap();

        assert!(!samples.is_empty());
        assert_eq!(samples[0].player, -1);
        for pair in samples.windows(2) {
            assert_eq!(pair[0].player, -pair[1].player);
            // Values of consecutive plies carry opposite perspectives.
            assert_eq!(pair[0].value, -pair[1].value);
        }
        for sample in &samples {
            assert_eq!(sample.board.len(), 64);
            assert_eq!(sample.policy.len(), 64);
            let sum: f32 = sample.policy.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert!(sample.value == 1.0 || sample.value == -1.0 || sample.value == 0.0);
        }
    }
}
