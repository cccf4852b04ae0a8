//! Gradient descent on the self-play corpus.
//!
//! The policy target is a full distribution (normalized visit counts), so
//! the policy loss is a soft cross-entropy against log-softmax logits. The
//! value loss is plain MSE against the game outcome.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use tch::{Kind, Tensor};

use crate::config::Config;
use crate::neural::encoding;
use crate::neural::manager::NetworkManager;
use crate::training::TrainingSample;
use crate::{Error, Result};

/// Append-only loss history, one `policyLoss|valueLoss` line per step.
pub struct LossLog {
    writer: BufWriter<File>,
}

impl LossLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn record(&mut self, policy_loss: f64, value_loss: f64) -> Result<()> {
        writeln!(self.writer, "{:.6}|{:.6}", policy_loss, value_loss)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Train both networks on the corpus for the configured number of epochs.
/// `shape` is the board geometry the samples were recorded on.
pub fn train(
    manager: &mut NetworkManager,
    corpus: &[TrainingSample],
    shape: (usize, usize),
    config: &Config,
) -> Result<()> {
    if corpus.is_empty() {
        return Err(Error::Training("empty training corpus".to_string()));
    }
    let (rows, cols) = shape;
    if corpus.iter().any(|s| s.board.len() != rows * cols) {
        return Err(Error::Training(format!(
            "sample board does not match the {}x{} shape",
            rows, cols
        )));
    }
    let mut loss_log = if config.record_loss {
        Some(LossLog::open(&config.loss_file)?)
    } else {
        None
    };

    let device = manager.device();
    let action_size = corpus[0].policy.len();

    log::info!(
        "🎓 training on {} samples, {} epochs, batch size {}",
        corpus.len(),
        config.epochs,
        config.batch_size
    );

    for epoch in 0..config.epochs {
        let mut policy_total = 0.0;
        let mut value_total = 0.0;
        let mut steps = 0usize;

        for batch in corpus.chunks(config.batch_size) {
            let inputs = Tensor::cat(
                &batch
                    .iter()
                    .map(|s| encoding::encode_position(&s.board, s.player, shape, device))
                    .collect::<Vec<_>>(),
                0,
            );

            let policy_flat: Vec<f32> =
                batch.iter().flat_map(|s| s.policy.iter().copied()).collect();
            let policy_targets = Tensor::from_slice(&policy_flat)
                .view([batch.len() as i64, action_size as i64])
                .to_device(device);
            let value_flat: Vec<f32> = batch.iter().map(|s| s.value).collect();
            let value_targets = Tensor::from_slice(&value_flat)
                .view([batch.len() as i64, 1])
                .to_device(device);

            let log_probs = manager
                .policy_net
                .forward(&inputs, true)
                .log_softmax(-1, Kind::Float);
            let policy_loss =
                -(policy_targets * log_probs).sum(Kind::Float) / (batch.len() as f64);
            manager.opt_policy.backward_step(&policy_loss);

            let value_preds = manager.value_net.forward(&inputs, true);
            let value_loss = value_preds.mse_loss(&value_targets, tch::Reduction::Mean);
            manager.opt_value.backward_step(&value_loss);

            let policy_scalar = policy_loss.double_value(&[]);
            let value_scalar = value_loss.double_value(&[]);
            policy_total += policy_scalar;
            value_total += value_scalar;
            steps += 1;

            if let Some(loss_log) = loss_log.as_mut() {
                loss_log.record(policy_scalar, value_scalar)?;
            }
        }

        log::debug!(
            "epoch {}/{}: policy loss {:.4}, value loss {:.4}",
            epoch + 1,
            config.epochs,
            policy_total / steps as f64,
            value_total / steps as f64
        );
    }

    if let Some(loss_log) = loss_log.as_mut() {
        loss_log.flush()?;
    }
    log::info!("✅ training pass complete");
    Ok(())
}
