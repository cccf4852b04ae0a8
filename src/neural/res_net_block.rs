use tch::{nn, Tensor};

/// Residual block with GroupNorm (more stable than BatchNorm at the small
/// batch sizes self-play produces).
pub struct ResNetBlock {
    conv1: nn::Conv2D,
    gn1: nn::GroupNorm,
    conv2: nn::Conv2D,
    gn2: nn::GroupNorm,
    downsample: Option<nn::Conv2D>,
}

impl ResNetBlock {
    pub fn new(path: &nn::Path, channels_in: i64, channels_out: i64) -> Self {
        let conv1 = nn::conv2d(
            path / "conv1",
            channels_in,
            channels_out,
            3,
            nn::ConvConfig {
                padding: 1,
                ..Default::default()
            },
        );
        let gn1 = nn::group_norm(path / "gn1", 16, channels_out, Default::default());
        let conv2 = nn::conv2d(
            path / "conv2",
            channels_out,
            channels_out,
            3,
            nn::ConvConfig {
                padding: 1,
                ..Default::default()
            },
        );
        let gn2 = nn::group_norm(path / "gn2", 16, channels_out, Default::default());

        // 1x1 conv on the skip path when the channel count changes
        let downsample = if channels_in != channels_out {
            Some(nn::conv2d(
                path / "downsample",
                channels_in,
                channels_out,
                1,
                Default::default(),
            ))
        } else {
            None
        };

        Self {
            conv1,
            gn1,
            conv2,
            gn2,
            downsample,
        }
    }

    pub fn forward(&self, x: &Tensor, train: bool) -> Tensor {
        let identity = if let Some(downsample) = &self.downsample {
            x.apply(downsample)
        } else {
            x.shallow_clone()
        };

        let out = x.apply(&self.conv1).apply_t(&self.gn1, train).relu();
        let out = out.apply(&self.conv2).apply_t(&self.gn2, train);

        (out + identity).relu()
    }
}
