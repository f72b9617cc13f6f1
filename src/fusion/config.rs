//! Fusion network configuration.

pub use super::*;

use burn::nn::{conv::Conv2dConfig, BatchNormConfig, PaddingConfig2d};

/// The configuration for [`FusionNet`].
#[derive(Config, Copy, Debug)]
pub struct FusionNetConfig {
    /// Appending a batch normalization to the output convolution.
    #[config(default = true)]
    pub batch_norm: bool,
    /// Feature channel count `F`, shared by the input and output features.
    #[config(default = 128)]
    pub dim_feature: usize,
    /// Channel count of the hidden convolutions.
    #[config(default = 64)]
    pub dim_hidden: usize,
    /// Adding the input features back to the output.
    #[config(default = false)]
    pub residual: bool,
}

impl FusionNetConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> FusionNet<B> {
        let dim_input = 3 + self.dim_feature;
        let dim_hidden = self.dim_hidden;
        let dim_output = self.dim_feature;

        let conv = |dim_input: usize, dim_output: usize, size: usize| {
            let padding = size / 2;
            Conv2dConfig::new([dim_input, dim_output], [size, size])
                .with_padding(PaddingConfig2d::Explicit(padding, padding))
                .init(device)
        };

        let conv1 = conv(dim_input, dim_hidden, 3);
        let conv2 = conv(dim_hidden, dim_hidden, 3);
        let conv3 = conv(dim_hidden, dim_hidden, 3);
        let conv_out = conv(dim_hidden, dim_output, 5);
        let activation = Relu::new();
        let norm = self
            .batch_norm
            .then(|| BatchNormConfig::new(dim_output).init(device));

        FusionNet {
            conv1,
            conv2,
            conv3,
            conv_out,
            activation,
            norm,
            dim_feature: self.dim_feature,
            residual: self.residual,
        }
    }
}

impl Default for FusionNetConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
