//! Network manager: owns the VarStores, networks and optimizers, and maps
//! logical checkpoint names like `"best_model"` to safetensors files.

use std::path::{Path, PathBuf};

use tch::nn::OptimizerConfig;
use tch::{nn, Device};

use crate::config::Config;
use crate::game::Game;
use crate::mcts::Predictor;
use crate::neural::encoding;
use crate::neural::model_io;
use crate::neural::policy_value_net::{PolicyNet, ValueNet};
use crate::Result;

const BOARD_SIDE: i64 = 8;
const ACTION_SIZE: i64 = BOARD_SIDE * BOARD_SIDE;
const INPUT_DIM: (i64, i64, i64) = (encoding::CHANNELS, BOARD_SIDE, BOARD_SIDE);

/// A policy/value network pair with its optimizers.
pub struct NetworkManager {
    device: Device,
    model_dir: PathBuf,
    vs_policy: nn::VarStore,
    vs_value: nn::VarStore,
    pub(crate) policy_net: PolicyNet,
    pub(crate) value_net: ValueNet,
    pub(crate) opt_policy: nn::Optimizer,
    pub(crate) opt_value: nn::Optimizer,
}

impl NetworkManager {
    /// Fresh Xavier-initialized networks on the best available device.
    pub fn new(config: &Config) -> Result<Self> {
        let device = Device::cuda_if_available();
        log::debug!("initializing networks on {:?}", device);

        let vs_policy = nn::VarStore::new(device);
        let vs_value = nn::VarStore::new(device);
        let policy_net = PolicyNet::new(&vs_policy, INPUT_DIM, ACTION_SIZE);
        let value_net = ValueNet::new(&vs_value, INPUT_DIM);

        let opt_policy = nn::Adam::default().build(&vs_policy, config.learning_rate)?;
        let opt_value = nn::Adam::default().build(&vs_value, config.learning_rate)?;

        Ok(Self {
            device,
            model_dir: PathBuf::from(&config.model_dir),
            vs_policy,
            vs_value,
            policy_net,
            value_net,
            opt_policy,
            opt_value,
        })
    }

    pub fn device(&self) -> Device {
        self.device
    }

    fn checkpoint_path(&self, name: &str, head: &str) -> PathBuf {
        self.model_dir.join(format!("{name}_{head}.safetensors"))
    }

    /// Persist both networks under a logical checkpoint name.
    pub fn save_checkpoint(&self, name: &str) -> Result<()> {
        std::fs::create_dir_all(&self.model_dir)?;
        model_io::save_varstore(&self.vs_policy, self.checkpoint_path(name, "policy"))?;
        model_io::save_varstore(&self.vs_value, self.checkpoint_path(name, "value"))?;
        log::info!("💾 saved checkpoint '{}'", name);
        Ok(())
    }

    /// Load a logical checkpoint into this pair.
    ///
    /// A missing checkpoint is not an error: the current (typically fresh)
    /// weights stay in place and `Ok(false)` is returned.
    pub fn load_checkpoint(&mut self, name: &str) -> Result<bool> {
        let policy_path = self.checkpoint_path(name, "policy");
        let value_path = self.checkpoint_path(name, "value");
        if !policy_path.exists() || !value_path.exists() {
            log::warn!(
                "📁 checkpoint '{}' not found in {}, keeping current weights",
                name,
                self.model_dir.display()
            );
            return Ok(false);
        }
        model_io::load_varstore(&mut self.vs_policy, &policy_path)?;
        model_io::load_varstore(&mut self.vs_value, &value_path)?;
        log::info!("📂 loaded checkpoint '{}'", name);
        Ok(true)
    }

    /// Whether both files of a logical checkpoint exist in a directory.
    pub fn checkpoint_exists(model_dir: &Path, name: &str) -> bool {
        model_dir.join(format!("{name}_policy.safetensors")).exists()
            && model_dir.join(format!("{name}_value.safetensors")).exists()
    }
}

impl<G: Game> Predictor<G> for NetworkManager {
    fn predict(&self, state: &G) -> Result<(Vec<f32>, f32)> {
        let input = encoding::encode_state(state, self.device);
        let (probs, value) = tch::no_grad(|| {
            let probs = self
                .policy_net
                .forward(&input, false)
                .softmax(-1, tch::Kind::Float);
            let value = self.value_net.forward(&input, false);
            (probs, value)
        });
        let policy = Vec::<f32>::try_from(&probs.flatten(0, -1).contiguous())?;
        let value = value.double_value(&[0, 0]) as f32;
        Ok((policy, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::OthelloGame;

    fn test_config(dir: &Path) -> Config {
        Config {
            model_dir: dir.to_string_lossy().into_owned(),
            ..Config::default()
        }
    }

    #[test]
    fn predict_returns_a_distribution_and_bounded_value() {
        let dir = tempfile::tempdir().unwrap();
        let manager = NetworkManager::new(&test_config(dir.path())).unwrap();
        let game = OthelloGame::new();

        let (policy, value) = manager.predict(&game).unwrap();

        assert_eq!(policy.len(), 64);
        let sum: f32 = policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!((-1.0..=1.0).contains(&value));
    }

    #[test]
    fn checkpoint_roundtrip_preserves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let game = OthelloGame::new();

        let manager = NetworkManager::new(&config).unwrap();
        let (before, _) = manager.predict(&game).unwrap();
        manager.save_checkpoint("current").unwrap();

        let mut other = NetworkManager::new(&config).unwrap();
        assert!(other.load_checkpoint("current").unwrap());
        let (after, _) = other.predict(&game).unwrap();

        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn missing_checkpoint_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = NetworkManager::new(&test_config(dir.path())).unwrap();
        assert!(!manager.load_checkpoint("best_model").unwrap());
        assert!(!NetworkManager::checkpoint_exists(dir.path(), "best_model"));
    }
}
