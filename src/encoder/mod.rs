//! Positional encoding, the sinusoidal feature expansion of coordinates.

pub mod config;

pub use crate::error::Error;
pub use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};
pub use config::*;

use std::f64::consts::PI;

/// Positional encoder.
///
/// ## Details
///
/// The encoding is the concatenation of the raw input (if included) and
/// `p(input * f)` for every frequency `f` (major) and basis function `p` (minor).
/// The order is relied upon by the widths of the downstream layers.
#[derive(Clone, Debug)]
pub struct PositionalEncoder {
    /// The configuration.
    pub config: PositionalEncoderConfig,
    /// `N`, the epoch at which all bands are fully unmasked.
    epochs_to_max_freq: Option<f64>,
    /// `[N_freqs]`
    frequencies: Vec<f64>,
}

impl PositionalEncoder {
    /// The frequencies of the bands in their output order.
    #[inline]
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// `D'`
    #[inline]
    pub fn output_dims(&self) -> usize {
        self.config.output_dims()
    }

    /// The horizon of the progressive schedule.
    #[inline]
    pub fn epochs_to_max_freq(&self) -> Option<f64> {
        self.epochs_to_max_freq
    }

    /// Setting the horizon of the progressive schedule.
    ///
    /// It can only be set once.
    pub fn set_epochs_to_max_freq(
        &mut self,
        epochs_to_max_freq: f64,
    ) -> Result<&mut Self, Error> {
        if let Some(horizon) = self.epochs_to_max_freq {
            return Err(Error::ProgressiveHorizon(format!(
                "the horizon is already set to {horizon}"
            )));
        }
        if !(epochs_to_max_freq.is_finite() && epochs_to_max_freq > 0.0) {
            return Err(Error::Validation(
                "epochs_to_max_freq".into(),
                format!("finite and positive, but got {epochs_to_max_freq}"),
            ));
        }

        self.epochs_to_max_freq = Some(epochs_to_max_freq);
        Ok(self)
    }

    /// Encodes the input.
    ///
    /// ## Shapes
    ///
    /// * `input` - `[..., D]`
    /// * `output` - `[..., D']`
    pub fn forward<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        self.forward_weighted(input, None)
    }

    /// Encodes the input with the coarse-to-fine band mask at `epoch`.
    ///
    /// Only the periodic terms are masked, never the raw input.
    pub fn forward_progressive<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
        epoch: f64,
    ) -> Result<Tensor<B, D>, Error> {
        let weights = self.band_weights(epoch)?;
        Ok(self.forward_weighted(input, Some(&weights)))
    }

    /// Encodes the input progressively if the horizon is set, otherwise plainly.
    pub fn encode<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
        epoch: Option<f64>,
    ) -> Result<Tensor<B, D>, Error> {
        match (self.epochs_to_max_freq, epoch) {
            (None, _) => Ok(self.forward(input)),
            (Some(_), Some(epoch)) => self.forward_progressive(input, epoch),
            (Some(_), None) => Err(Error::ProgressiveHorizon(
                "the epoch should be provided to the progressive encoder".into(),
            )),
        }
    }

    /// `W_j = (1 - cos(pi * clamp(alpha - j, 0, 1))) / 2`,
    /// where `alpha = N_freqs * epoch / N`.
    pub fn band_weights(
        &self,
        epoch: f64,
    ) -> Result<Vec<f64>, Error> {
        let horizon = self.epochs_to_max_freq.ok_or_else(|| {
            Error::ProgressiveHorizon("the horizon should be set".into())
        })?;
        let alpha = self.frequencies.len() as f64 * epoch / horizon;

        Ok((0..self.frequencies.len())
            .map(|index| {
                let progress = (alpha - index as f64).clamp(0.0, 1.0);
                (1.0 - (PI * progress).cos()) / 2.0
            })
            .collect())
    }

    fn forward_weighted<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
        weights: Option<&[f64]>,
    ) -> Tensor<B, D> {
        debug_assert_eq!(
            input.dims()[D - 1],
            self.config.input_dims,
            "The last dimension of input should be input_dims",
        );

        if self.frequencies.is_empty() {
            return input;
        }

        let functions = &self.config.periodic_functions;
        let mut terms = Vec::with_capacity(
            self.frequencies.len() * functions.len() + 1,
        );
        if self.config.include_input {
            terms.push(input.to_owned());
        }
        for (index, frequency) in self.frequencies.iter().enumerate() {
            let input_scaled = input.to_owned().mul_scalar(*frequency);
            let weight = weights.map(|weights| weights[index]);
            for function in functions {
                let term = function.forward(input_scaled.to_owned());
                terms.push(match weight {
                    Some(weight) => term.mul_scalar(weight),
                    None => term,
                });
            }
        }

        Tensor::cat(terms, D - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::Distribution};

    type B = NdArray<f32>;

    #[test]
    fn forward_identity_without_bands() {
        let device = &Default::default();

        let encoder = PositionalEncoderConfig::preset(10, EncodingPreset::Removed)
            .init()
            .unwrap();
        let input = Tensor::<B, 2>::random([7, 3], Distribution::Default, device);
        let output = encoder.forward(input.to_owned());
        output.into_data().assert_eq(&input.into_data(), true);

        let encoder = PositionalEncoderConfig::preset(0, EncodingPreset::Default)
            .with_include_input(false)
            .init()
            .unwrap();
        let input = Tensor::<B, 2>::random([4, 3], Distribution::Default, device);
        let output = encoder.forward(input.to_owned());
        output.into_data().assert_eq(&input.into_data(), true);
    }

    #[test]
    fn forward_output_dims() {
        let device = &Default::default();

        for (input_dims, num_freqs, functions, include_input) in [
            (3, 10, vec![PeriodicFunction::Sin, PeriodicFunction::Cos], true),
            (3, 4, vec![PeriodicFunction::Sin, PeriodicFunction::Cos], false),
            (2, 1, vec![PeriodicFunction::Cos], true),
            (5, 3, vec![PeriodicFunction::Sin], false),
        ] {
            let config = PositionalEncoderConfig::new()
                .with_input_dims(input_dims)
                .with_num_freqs(num_freqs)
                .with_max_freq_log2(num_freqs as u32 - 1)
                .with_include_input(include_input)
                .with_periodic_functions(functions.to_owned());
            let target = if include_input {
                input_dims * (1 + num_freqs * functions.len())
            } else {
                input_dims * num_freqs * functions.len()
            };
            assert_eq!(config.output_dims(), target);

            let encoder = config.init().unwrap();
            let input = Tensor::<B, 3>::random(
                [2, 5, input_dims],
                Distribution::Default,
                device,
            );
            assert_eq!(encoder.forward(input).dims(), [2, 5, target]);
        }
    }

    #[test]
    fn forward_order() {
        let device = &Default::default();

        let encoder = PositionalEncoderConfig::new()
            .with_input_dims(2)
            .with_max_freq_log2(1)
            .with_num_freqs(2)
            .init()
            .unwrap();
        let input = Tensor::<B, 2>::from_floats([[0.25, -0.5]], device);
        let output = encoder.forward(input);

        let (x, y) = (0.25_f32, -0.5_f32);
        let target = Tensor::<B, 2>::from_floats(
            [[
                x,
                y,
                x.sin(),
                y.sin(),
                x.cos(),
                y.cos(),
                (2.0 * x).sin(),
                (2.0 * y).sin(),
                (2.0 * x).cos(),
                (2.0 * y).cos(),
            ]],
            device,
        );
        output.into_data().assert_approx_eq(&target.into_data(), 6);
    }

    #[test]
    fn band_weights() {
        let mut encoder = PositionalEncoderConfig::new()
            .with_num_freqs(4)
            .with_max_freq_log2(3)
            .init()
            .unwrap();

        assert!(matches!(
            encoder.band_weights(1.0),
            Err(Error::ProgressiveHorizon(_))
        ));

        encoder.set_epochs_to_max_freq(8.0).unwrap();
        assert!(matches!(
            encoder.set_epochs_to_max_freq(16.0),
            Err(Error::ProgressiveHorizon(_))
        ));
        assert_eq!(encoder.epochs_to_max_freq(), Some(8.0));

        assert_eq!(encoder.band_weights(0.0).unwrap(), vec![0.0; 4]);
        assert_eq!(encoder.band_weights(8.0).unwrap(), vec![1.0; 4]);
        assert_eq!(encoder.band_weights(100.0).unwrap(), vec![1.0; 4]);

        // alpha = 4 * 3 / 8 = 1.5
        let weights = encoder.band_weights(3.0).unwrap();
        assert_eq!(weights[0], 1.0);
        assert!((weights[1] - 0.5).abs() < 1e-12);
        assert_eq!(weights[2], 0.0);
        assert_eq!(weights[3], 0.0);

        let weights = encoder.band_weights(2.5).unwrap();
        assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn forward_progressive_keeps_input() {
        let device = &Default::default();

        let mut encoder = PositionalEncoderConfig::new()
            .with_input_dims(1)
            .with_num_freqs(2)
            .with_max_freq_log2(1)
            .init()
            .unwrap();
        encoder.set_epochs_to_max_freq(10.0).unwrap();

        let input = Tensor::<B, 2>::from_floats([[0.5], [1.0]], device);

        let output = encoder.forward_progressive(input.to_owned(), 0.0).unwrap();
        output.into_data().assert_approx_eq(
            &Tensor::<B, 2>::from_floats(
                [[0.5, 0.0, 0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0, 0.0]],
                device,
            )
            .into_data(),
            6,
        );

        let output = encoder.forward_progressive(input.to_owned(), 10.0).unwrap();
        output
            .into_data()
            .assert_approx_eq(&encoder.forward(input.to_owned()).into_data(), 6);

        assert!(encoder.encode(input.to_owned(), None).is_err());
        assert!(encoder.encode(input, Some(5.0)).is_ok());
    }
}
