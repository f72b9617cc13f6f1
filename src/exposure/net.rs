//! Exposure embedding network.

pub use super::*;
pub use burn::nn::{Linear, Relu};

use burn::nn::LinearConfig;
use humansize::{format_size, BINARY};

/// The configuration for [`ExposureNet`].
#[derive(Config, Copy, Debug)]
pub struct ExposureNetConfig {
    /// Histogram bin count `H`.
    #[config(default = 10)]
    pub dim_input: usize,
    /// Hidden layer dimension.
    #[config(default = 32)]
    pub dim_hidden: usize,
    /// Hidden layer count.
    #[config(default = 3)]
    pub hidden_layer_count: usize,
}

/// Fully connected network with ReLU hidden activations and a linear output.
#[derive(Debug, Module)]
pub struct ExposureNet<B: Backend> {
    /// The linear layers before each ReLU activation.
    pub hidden: Vec<Linear<B>>,
    /// The ReLU activation.
    pub activation: Relu,
    /// The output linear layer.
    pub output: Linear<B>,
}

impl ExposureNetConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<ExposureNet<B>, Error> {
        if self.dim_input == 0
            || self.dim_hidden == 0
            || self.hidden_layer_count == 0
        {
            return Err(Error::Validation(
                "the dimensions and hidden layer count of ExposureNet".into(),
                "positive".into(),
            ));
        }

        let hidden = (0..self.hidden_layer_count)
            .map(|index| {
                let dim_input = if index == 0 {
                    self.dim_input
                } else {
                    self.dim_hidden
                };
                LinearConfig::new(dim_input, self.dim_hidden).init(device)
            })
            .collect();
        let activation = Relu::new();
        let output =
            LinearConfig::new(self.dim_hidden, EXPOSURE_EMBEDDING_DIM).init(device);

        Ok(ExposureNet {
            hidden,
            activation,
            output,
        })
    }
}

impl<B: Backend> ExposureNet<B> {
    /// Applies the forward pass on the input tensor.
    ///
    /// ## Shapes
    ///
    /// * `input` - [`[..., dim_input]`](ExposureNetConfig::dim_input)
    /// * `output` - `[..., 12]`
    pub fn forward<const D: usize>(
        &self,
        mut input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        for layer in &self.hidden {
            input = layer.forward(input);
            input = self.activation.forward(input);
        }
        self.output.forward(input)
    }

    /// Size of the parameters in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.num_params() * size_of::<B::FloatElem>()
    }

    /// Readable size of the parameters.
    #[inline]
    pub fn size_readable(&self) -> String {
        format_size(self.size(), BINARY.decimal_places(1))
    }
}

impl<B: Backend> ExposureEmbedding<B> for ExposureNet<B> {
    #[inline]
    fn embed(
        &self,
        histograms: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        self.forward(histograms)
    }
}

impl Default for ExposureNetConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
