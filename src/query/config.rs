//! Network query configuration.

pub use super::*;

use crate::encoder::EncodingPreset;

/// The configuration for [`NetworkQuery`].
#[derive(Config, Debug)]
pub struct NetworkQueryConfig {
    /// The maximum count of samples fed to the field at once.
    #[config(default = "1 << 16")]
    pub chunk_size: usize,
    /// Encoder for view directions.
    pub direction_encoder: PositionalEncoderConfig,
    /// Encoder for sample positions.
    pub position_encoder: PositionalEncoderConfig,
}

impl NetworkQueryConfig {
    /// Initialize from the configuration.
    pub fn init(&self) -> Result<NetworkQuery, Error> {
        if self.chunk_size == 0 {
            return Err(Error::Validation("chunk_size".into(), "positive".into()));
        }

        Ok(NetworkQuery {
            chunk_size: self.chunk_size,
            direction_encoder: self.direction_encoder.init()?,
            position_encoder: self.position_encoder.init()?,
        })
    }
}

impl Default for NetworkQueryConfig {
    /// 4 bands for directions and 10 bands for positions.
    #[inline]
    fn default() -> Self {
        Self::new(
            PositionalEncoderConfig::preset(4, EncodingPreset::Default),
            PositionalEncoderConfig::preset(10, EncodingPreset::Default),
        )
    }
}
