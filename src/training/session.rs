//! The outer training loop.
//!
//! Each iteration runs self-play with the candidate network, snapshots it as
//! the `"current"` checkpoint, trains on the generated corpus, and then lets
//! the trained candidate challenge its own pre-training snapshot. Only a
//! strict win-rate victory promotes the candidate to `"best_model"`; a loss
//! rolls the weights back to the snapshot, so the best-known state is never
//! regressed.

use rand::Rng;

use crate::config::Config;
use crate::game::{Game, OthelloGame};
use crate::neural::{trainer, NetworkManager};
use crate::training::augment::augment_sample;
use crate::training::evaluator::Evaluator;
use crate::training::selfplay::SelfPlayDriver;
use crate::training::TrainingSample;
use crate::Result;

pub struct TrainingSession {
    config: Config,
    candidate: NetworkManager,
    eval_net: NetworkManager,
}

impl TrainingSession {
    /// Set up both network slots, resuming from `"best_model"` if one is on
    /// disk.
    pub fn new(config: &Config) -> Result<Self> {
        let mut candidate = NetworkManager::new(config)?;
        if candidate.load_checkpoint("best_model")? {
            log::info!("♻️ resuming from existing best model");
        }
        let eval_net = NetworkManager::new(config)?;
        Ok(Self {
            config: config.clone(),
            candidate,
            eval_net,
        })
    }

    /// Run the full loop on the standard Othello opening position.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        self.run_with(&OthelloGame::new(), rng)
    }

    /// Run the full loop on any game.
    pub fn run_with<G, R>(&mut self, start: &G, rng: &mut R) -> Result<()>
    where
        G: Game,
        R: Rng,
    {
        for iteration in 1..=self.config.num_iterations {
            log::info!(
                "🔁 iteration {}/{}",
                iteration,
                self.config.num_iterations
            );

            let corpus = self.generate_corpus(start, rng)?;
            log::info!("🎲 self-play produced {} training samples", corpus.len());

            // Snapshot the pre-training weights: they are both the opponent
            // for evaluation and the rollback target on discard.
            self.candidate.save_checkpoint("current")?;
            self.eval_net.load_checkpoint("current")?;

            trainer::train(&mut self.candidate, &corpus, start.board_shape(), &self.config)?;

            let stats = {
                let evaluator = Evaluator::new(&self.candidate, &self.eval_net, &self.config);
                evaluator.run(start, rng)?
            };

            if stats.win_rate() > self.config.eval_win_rate {
                log::info!(
                    "🏆 candidate promoted (win rate {:.2} > {:.2})",
                    stats.win_rate(),
                    self.config.eval_win_rate
                );
                self.candidate.save_checkpoint("best_model")?;
            } else {
                log::info!(
                    "🗑️ candidate discarded (win rate {:.2} <= {:.2}), rolling back",
                    stats.win_rate(),
                    self.config.eval_win_rate
                );
                self.candidate.load_checkpoint("current")?;
            }
        }
        Ok(())
    }

    fn generate_corpus<G, R>(&self, start: &G, rng: &mut R) -> Result<Vec<TrainingSample>>
    where
        G: Game,
        R: Rng,
    {
        let driver = SelfPlayDriver::new(&self.candidate, &self.config);
        let eligible = self.config.augment && start.symmetry_eligible();
        let shape = start.board_shape();

        let mut corpus = Vec::new();
        for game_idx in 0..self.config.num_games {
            let samples = driver.play_game(start.clone(), rng)?;
            log::debug!(
                "self-play game {}/{}: {} plies",
                game_idx + 1,
                self.config.num_games,
                samples.len()
            );
            for sample in &samples {
                corpus.extend(augment_sample(sample, shape, eligible));
            }
        }
        Ok(corpus)
    }
}
