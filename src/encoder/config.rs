//! Positional encoder configuration.

pub use super::*;

/// A periodic basis function applied to the scaled input.
#[derive(Config, Copy, Debug, PartialEq, Eq)]
pub enum PeriodicFunction {
    Sin,
    Cos,
}

/// Presets of the positional encoder, parameterized by the band count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncodingPreset {
    /// `multires` bands up to `2^(multires - 1)`.
    #[default]
    Default,
    /// Half of the bands of [`EncodingPreset::Default`].
    Reduced,
    /// No bands, i.e., the identity.
    Removed,
    /// The same bands as [`EncodingPreset::Default`],
    /// masked in coarse-to-fine order by the epoch.
    Progressive,
}

/// The configuration for [`PositionalEncoder`].
#[derive(Config, Debug)]
pub struct PositionalEncoderConfig {
    /// Prepending the raw input to the encoding.
    #[config(default = true)]
    pub include_input: bool,
    /// `D`
    #[config(default = 3)]
    pub input_dims: usize,
    /// The highest frequency is `2^max_freq_log2`.
    #[config(default = 9)]
    pub max_freq_log2: u32,
    /// `N_freqs`
    #[config(default = 10)]
    pub num_freqs: usize,
    /// Geometric spacing of the frequencies if `true`, otherwise arithmetic.
    #[config(default = true)]
    pub log_sampling: bool,
    /// The basis functions in their output order.
    #[config(default = "vec![PeriodicFunction::Sin, PeriodicFunction::Cos]")]
    pub periodic_functions: Vec<PeriodicFunction>,
}

impl PositionalEncoderConfig {
    /// The configuration of 3D inputs with sine and cosine bases.
    pub fn preset(
        multires: usize,
        preset: EncodingPreset,
    ) -> Self {
        let (max_freq_log2, num_freqs) = match preset {
            EncodingPreset::Default | EncodingPreset::Progressive => {
                (multires.saturating_sub(1) as u32, multires)
            },
            EncodingPreset::Reduced => {
                (multires.saturating_sub(1) as u32 / 2, multires / 2)
            },
            EncodingPreset::Removed => (0, 0),
        };
        Self::new()
            .with_max_freq_log2(max_freq_log2)
            .with_num_freqs(num_freqs)
    }

    /// `D'`
    ///
    /// It is `D * (1 + N_freqs * B)` if the input is included,
    /// otherwise `D * N_freqs * B`, where `B` is the count of basis functions.
    /// Without any band, the encoding is the identity and it is `D`.
    pub fn output_dims(&self) -> usize {
        if self.num_freqs == 0 {
            return self.input_dims;
        }
        let term_count = self.num_freqs * self.periodic_functions.len()
            + self.include_input as usize;
        self.input_dims * term_count
    }

    /// Initialize from the configuration.
    pub fn init(&self) -> Result<PositionalEncoder, Error> {
        if self.input_dims == 0 {
            return Err(Error::Validation(
                "input_dims".into(),
                "positive".into(),
            ));
        }
        if self.num_freqs != 0 && self.periodic_functions.is_empty() {
            return Err(Error::Validation(
                "periodic_functions".into(),
                "non-empty when num_freqs is positive".into(),
            ));
        }

        let max = 2.0_f64.powi(self.max_freq_log2 as i32);
        let step = |index: usize| {
            if self.num_freqs < 2 {
                0.0
            } else {
                index as f64 / (self.num_freqs - 1) as f64
            }
        };
        let frequencies = (0..self.num_freqs)
            .map(|index| {
                if self.log_sampling {
                    2.0_f64.powf(self.max_freq_log2 as f64 * step(index))
                } else {
                    1.0 + (max - 1.0) * step(index)
                }
            })
            .collect();

        Ok(PositionalEncoder {
            config: self.to_owned(),
            epochs_to_max_freq: None,
            frequencies,
        })
    }
}

impl PeriodicFunction {
    /// Applies the function elementwise.
    pub fn forward<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        match self {
            Self::Sin => input.sin(),
            Self::Cos => input.cos(),
        }
    }
}

impl Default for PositionalEncoderConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
