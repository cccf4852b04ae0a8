//! Policy and value networks.
//!
//! Both share the same shape: a conv stem into a stack of residual blocks,
//! then a fully connected trunk. The policy head emits raw logits over the
//! action space (softmax happens at the call site, log-softmax in the
//! trainer); the value head emits a tanh scalar in `[-1, 1]`.

use tch::{nn, Tensor};

use crate::neural::res_net_block::ResNetBlock;

const STEM_CHANNELS: i64 = 64;
const NUM_RES_BLOCKS: usize = 5;
const FC_WIDTH: i64 = 512;
const DROPOUT_RATE: f64 = 0.3;

pub struct PolicyNet {
    conv1: nn::Conv2D,
    gn1: nn::GroupNorm,
    res_blocks: Vec<ResNetBlock>,
    fc1: nn::Linear,
    policy_head: nn::Linear,
}

impl PolicyNet {
    pub fn new(vs: &nn::VarStore, input_dim: (i64, i64, i64), action_size: i64) -> Self {
        let p = vs.root();
        let (channels, height, width) = input_dim;

        let conv1 = nn::conv2d(
            &p / "policy_conv1",
            channels,
            STEM_CHANNELS,
            3,
            nn::ConvConfig {
                padding: 1,
                ..Default::default()
            },
        );
        let gn1 = nn::group_norm(&p / "policy_gn1", 16, STEM_CHANNELS, Default::default());

        let res_blocks = (0..NUM_RES_BLOCKS)
            .map(|idx| {
                ResNetBlock::new(
                    &(vs.root() / format!("policy_block_{idx}")),
                    STEM_CHANNELS,
                    STEM_CHANNELS,
                )
            })
            .collect();

        // Padding keeps the spatial dimensions, so the flatten size is fixed.
        let flatten_size = STEM_CHANNELS * height * width;
        let fc1 = nn::linear(&p / "policy_fc1", flatten_size, FC_WIDTH, Default::default());
        let policy_head = nn::linear(&p / "policy_head", FC_WIDTH, action_size, Default::default());

        initialize_weights(vs);

        Self {
            conv1,
            gn1,
            res_blocks,
            fc1,
            policy_head,
        }
    }

    /// Returns logits of shape `[batch, action_size]`.
    pub fn forward(&self, x: &Tensor, train: bool) -> Tensor {
        let mut h = x.apply(&self.conv1).apply_t(&self.gn1, train).relu();
        for block in &self.res_blocks {
            h = block.forward(&h, train);
        }

        let size = h.size();
        let flattened = size[1] * size[2] * size[3];
        h = h.view([-1, flattened]).apply(&self.fc1).relu();
        if train {
            h = h.dropout(DROPOUT_RATE, train);
        }

        h.apply(&self.policy_head)
    }
}

pub struct ValueNet {
    conv1: nn::Conv2D,
    gn1: nn::GroupNorm,
    res_blocks: Vec<ResNetBlock>,
    fc1: nn::Linear,
    value_head: nn::Linear,
}

impl ValueNet {
    pub fn new(vs: &nn::VarStore, input_dim: (i64, i64, i64)) -> Self {
        let p = vs.root();
        let (channels, height, width) = input_dim;

        let conv1 = nn::conv2d(
            &p / "value_conv1",
            channels,
            STEM_CHANNELS,
            3,
            nn::ConvConfig {
                padding: 1,
                ..Default::default()
            },
        );
        let gn1 = nn::group_norm(&p / "value_gn1", 16, STEM_CHANNELS, Default::default());

        let res_blocks = (0..NUM_RES_BLOCKS)
            .map(|idx| {
                ResNetBlock::new(
                    &(vs.root() / format!("value_block_{idx}")),
                    STEM_CHANNELS,
                    STEM_CHANNELS,
                )
            })
            .collect();

        let flatten_size = STEM_CHANNELS * height * width;
        let fc1 = nn::linear(&p / "value_fc1", flatten_size, FC_WIDTH, Default::default());
        let value_head = nn::linear(&p / "value_head", FC_WIDTH, 1, Default::default());

        initialize_weights(vs);

        Self {
            conv1,
            gn1,
            res_blocks,
            fc1,
            value_head,
        }
    }

    /// Returns values of shape `[batch, 1]` in `[-1, 1]`.
    pub fn forward(&self, x: &Tensor, train: bool) -> Tensor {
        let mut h = x.apply(&self.conv1).apply_t(&self.gn1, train).relu();
        for block in &self.res_blocks {
            h = block.forward(&h, train);
        }

        let size = h.size();
        let flattened = size[1] * size[2] * size[3];
        h = h.view([-1, flattened]).apply(&self.fc1).relu();
        if train {
            h = h.dropout(DROPOUT_RATE, train);
        }

        h.apply(&self.value_head).tanh()
    }
}

/// Xavier initialization for conv and linear weights, zeros for biases.
pub fn initialize_weights(vs: &nn::VarStore) {
    for (name, mut param) in vs.variables() {
        let size = param.size();

        if size.len() == 4 {
            let fan_in = (size[1] * size[2] * size[3]) as f64;
            let fan_out = (size[0] * size[2] * size[3]) as f64;
            let bound = (6.0 / (fan_in + fan_out)).sqrt();
            tch::no_grad(|| {
                let _ = param.uniform_(-bound, bound);
            });
        } else if size.len() == 2 {
            let fan_in = size[1] as f64;
            let fan_out = size[0] as f64;
            let bound = (6.0 / (fan_in + fan_out)).sqrt();
            tch::no_grad(|| {
                let _ = param.uniform_(-bound, bound);
            });
        } else if size.len() == 1 {
            tch::no_grad(|| {
                let _ = param.zero_();
            });
        }

        if param.isnan().any().double_value(&[]) > 0.0 {
            log::error!("🚨 NaN in {} after initialization", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn, Device, Tensor};

    #[test]
    fn policy_net_emits_one_logit_per_action() {
        let vs = nn::VarStore::new(Device::Cpu);
        let net = PolicyNet::new(&vs, (3, 8, 8), 64);

        let input = Tensor::rand([2, 3, 8, 8], tch::kind::FLOAT_CPU);
        let output = net.forward(&input, false);

        assert_eq!(output.size(), vec![2, 64]);
    }

    #[test]
    fn policy_softmax_is_a_distribution() {
        let vs = nn::VarStore::new(Device::Cpu);
        let net = PolicyNet::new(&vs, (3, 8, 8), 64);

        let input = Tensor::rand([1, 3, 8, 8], tch::kind::FLOAT_CPU);
        let probs = net.forward(&input, false).softmax(-1, tch::Kind::Float);
        let sum = probs.sum(tch::Kind::Float).double_value(&[]);

        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn value_net_output_is_bounded() {
        let vs = nn::VarStore::new(Device::Cpu);
        let net = ValueNet::new(&vs, (3, 8, 8));

        let input = Tensor::rand([4, 3, 8, 8], tch::kind::FLOAT_CPU);
        let output = net.forward(&input, false);

        assert_eq!(output.size(), vec![4, 1]);
        let max = output.abs().max().double_value(&[]);
        assert!(max <= 1.0);
    }
}
