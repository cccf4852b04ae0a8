//! Training configuration.
//!
//! One explicit value constructed at startup (defaults, a JSON file, CLI
//! overrides) and passed by reference everywhere. Nothing in the core
//! mutates it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hyperparameters for search, self-play, training and evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outer training iterations (self-play → train → evaluate).
    pub num_iterations: usize,
    /// Self-play games per iteration.
    pub num_games: usize,
    /// MCTS simulations per move.
    pub num_mcts_sims: usize,
    /// Exploration constant in the PUCT formula.
    pub c_puct: f64,
    /// Temperature for early plies of self-play games.
    pub temp_init: f64,
    /// Temperature after `temp_thresh` plies (near-deterministic).
    pub temp_final: f64,
    /// Ply count at which the temperature drops to `temp_final`.
    pub temp_thresh: usize,
    /// Dirichlet concentration for root exploration noise.
    pub dirichlet_alpha: f64,
    /// Mixing weight of the root noise.
    pub epsilon: f64,
    /// Head-to-head games per promotion evaluation.
    pub num_eval_games: usize,
    /// Win rate the candidate must strictly exceed to be promoted.
    pub eval_win_rate: f64,
    /// Training epochs over the self-play corpus.
    pub epochs: usize,
    /// Minibatch size.
    pub batch_size: usize,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Directory for model checkpoints.
    pub model_dir: String,
    /// Append per-step losses to `loss_file`.
    pub record_loss: bool,
    /// Loss log path, one `policyLoss|valueLoss` line per step.
    pub loss_file: String,
    /// Apply the 8-symmetry augmentation when the game supports it.
    pub augment: bool,
    /// Seed for the training RNG.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_iterations: 5,
            num_games: 30,
            num_mcts_sims: 100,
            c_puct: 5.0,
            temp_init: 1.0,
            temp_final: 1e-3,
            temp_thresh: 10,
            dirichlet_alpha: 0.5,
            epsilon: 0.25,
            num_eval_games: 10,
            eval_win_rate: 0.55,
            epochs: 30,
            batch_size: 128,
            learning_rate: 0.01,
            model_dir: "models".to_string(),
            record_loss: true,
            loss_file: "loss.txt".to_string(),
            augment: true,
            seed: 42,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields keep their
    /// defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.num_mcts_sims, 100);
        assert_eq!(config.c_puct, 5.0);
        assert_eq!(config.temp_thresh, 10);
        assert!(config.eval_win_rate > 0.5);
        assert!(config.epsilon > 0.0 && config.epsilon < 1.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"num_games": 4, "c_puct": 2.5}}"#).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.num_games, 4);
        assert_eq!(config.c_puct, 2.5);
        assert_eq!(config.num_iterations, 5);
        assert_eq!(config.loss_file, "loss.txt");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_mcts_sims, config.num_mcts_sims);
        assert_eq!(back.model_dir, config.model_dir);
    }
}
