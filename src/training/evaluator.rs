//! Head-to-head evaluation of a candidate network against the current best.
//!
//! The candidate always controls the `+1` role and the best network the `-1`
//! role; who actually moves first is decided by the game's own starting
//! player. Both sides play near-deterministically, without exploration
//! noise, and share one search tree that is rerooted after every move.

use rand::Rng;

use crate::config::Config;
use crate::game::Game;
use crate::mcts::{Mcts, Predictor, SearchConfig, SearchNode};
use crate::Result;

/// Match tally from the candidate's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl MatchStats {
    pub fn total(&self) -> usize {
        self.wins + self.losses + self.draws
    }

    /// Fraction of games won. Draws count against the candidate; an empty
    /// match is a rate of zero, so it can never promote.
    pub fn win_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }
}

pub struct Evaluator<'a, C, B> {
    candidate: Mcts<'a, C>,
    best: Mcts<'a, B>,
    temperature: f64,
    num_games: usize,
}

impl<'a, C, B> Evaluator<'a, C, B> {
    pub fn new(candidate: &'a C, best: &'a B, config: &Config) -> Self {
        Self {
            candidate: Mcts::new(candidate, SearchConfig::from_config(config, false)),
            best: Mcts::new(best, SearchConfig::from_config(config, false)),
            temperature: config.temp_final,
            num_games: config.num_eval_games,
        }
    }

    /// Play the configured number of games from `start` and tally results
    /// for the candidate.
    pub fn run<G, R>(&self, start: &G, rng: &mut R) -> Result<MatchStats>
    where
        G: Game,
        C: Predictor<G>,
        B: Predictor<G>,
        R: Rng,
    {
        let mut stats = MatchStats::default();
        for game_idx in 0..self.num_games {
            let outcome = self.play_one(start.clone(), rng)?;
            match outcome {
                1 => stats.wins += 1,
                -1 => stats.losses += 1,
                _ => stats.draws += 1,
            }
            log::debug!(
                "evaluation game {}/{}: candidate outcome {}",
                game_idx + 1,
                self.num_games,
                outcome
            );
        }
        log::info!(
            "⚔️ evaluation: {} wins, {} losses, {} draws (win rate {:.2})",
            stats.wins,
            stats.losses,
            stats.draws,
            stats.win_rate()
        );
        Ok(stats)
    }

    /// One game, returning the outcome from the candidate's perspective.
    fn play_one<G, R>(&self, mut state: G, rng: &mut R) -> Result<i8>
    where
        G: Game,
        C: Predictor<G>,
        B: Predictor<G>,
        R: Rng,
    {
        let mut root = SearchNode::new_root();
        loop {
            let (terminal, outcome) = state.check_game_over(1);
            if terminal {
                return Ok(outcome);
            }
            let action = if state.current_player() == 1 {
                self.candidate
                    .search(&state, &mut root, self.temperature, rng)?
                    .action
            } else {
                self.best
                    .search(&state, &mut root, self.temperature, rng)?
                    .action
            };
            state.apply_move(action)?;
            root = root.reroot(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::OthelloGame;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn win_rate_against_the_promotion_gate() {
        let promote = MatchStats {
            wins: 6,
            losses: 3,
            draws: 1,
        };
        assert!(promote.win_rate() > 0.55);

        let discard = MatchStats {
            wins: 5,
            losses: 5,
            draws: 0,
        };
        assert!(discard.win_rate() <= 0.55);
    }

    #[test]
    fn zero_games_never_promote() {
        let stats = MatchStats::default();
        assert_eq!(stats.win_rate(), 0.0);
    }

    #[test]
    fn draws_count_against_the_candidate() {
        let stats = MatchStats {
            wins: 5,
            losses: 0,
            draws: 5,
        };
        assert_eq!(stats.win_rate(), 0.5);
    }

    struct FlatPredictor;

    impl Predictor<OthelloGame> for FlatPredictor {
        fn predict(&self, state: &OthelloGame) -> crate::Result<(Vec<f32>, f32)> {
            let n = state.action_size();
            Ok((vec![1.0 / n as f32; n], 0.0))
        }
    }

    #[test]
    fn every_game_reaches_a_verdict() {
        let candidate = FlatPredictor;
        let best = FlatPredictor;
        let config = Config {
            num_mcts_sims: 4,
            num_eval_games: 3,
            ..Config::default()
        };
        let evaluator = Evaluator::new(&candidate, &best, &config);
        let mut rng = StdRng::seed_from_u64(17);

        let stats = evaluator.run(&OthelloGame::new(), &mut rng).unwrap();
        assert_eq!(stats.total(), 3);
    }
}
