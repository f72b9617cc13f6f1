//! Batched network query over ray samples.

pub mod config;

pub use crate::{
    encoder::{PositionalEncoder, PositionalEncoderConfig},
    error::Error,
    render::volume::RawSamples,
};
pub use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};
pub use config::*;

/// The layout of the per-sample predictions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryMode {
    /// `[density]`
    Density,
    /// `[color (C), density]`
    Static,
    /// `[color (C), density, transient color (3), transient density, beta]`
    Transient,
}

/// A radiance field, which maps encoded samples to per-sample predictions.
///
/// It is opaque to the compositor, only the output width is declared.
pub trait RadianceField<B: Backend> {
    /// `C`, the count of static color channels, i.e., RGB and auxiliary features.
    fn color_channel_count(&self) -> usize;

    /// Predicts the raw attributes of the samples.
    ///
    /// ## Shapes
    ///
    /// * `input` - `[N, D'_position]` in [`QueryMode::Density`],
    ///   otherwise `[N, D'_position + D'_direction]`
    /// * `output` - `[N, K]`, where `K` is [`QueryMode::channel_count`]
    fn forward(
        &self,
        input: Tensor<B, 2>,
        mode: QueryMode,
    ) -> Tensor<B, 2>;
}

/// The inputs of [`NetworkQuery::query`].
#[derive(Clone, Debug)]
pub struct QueryInput<B: Backend> {
    /// `[R, S, 3]`
    pub positions: Tensor<B, 3>,
    /// `[R, 3]`
    ///
    /// They are shared by all samples of a ray.
    pub directions: Tensor<B, 2>,
    /// The epoch for progressive position encoding.
    pub epoch: Option<f64>,
}

/// Batched network query.
#[derive(Clone, Debug)]
pub struct NetworkQuery {
    /// The maximum count of samples in a chunk.
    pub chunk_size: usize,
    /// Encoder for view directions.
    pub direction_encoder: PositionalEncoder,
    /// Encoder for sample positions.
    pub position_encoder: PositionalEncoder,
}

impl QueryMode {
    /// `K`
    #[inline]
    pub const fn channel_count(
        &self,
        color_channel_count: usize,
    ) -> usize {
        match self {
            Self::Density => 1,
            Self::Static => color_channel_count + 1,
            Self::Transient => color_channel_count + 1 + 3 + 1 + 1,
        }
    }
}

impl NetworkQuery {
    /// Queries the field for all samples chunk by chunk.
    ///
    /// ## Details
    ///
    /// The directions are broadcast to the samples of each ray before encoding.
    /// In [`QueryMode::Density`], the directions are neither encoded nor fed.
    pub fn query<B: Backend, F: RadianceField<B> + ?Sized>(
        &self,
        field: &F,
        input: QueryInput<B>,
        mode: QueryMode,
    ) -> Result<RawSamples<B>, Error> {
        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(target: "radiance_compositor::query", "query");

        // R, S
        let [ray_count, sample_count, dim_position] = input.positions.dims();
        // R * S
        let point_count = ray_count * sample_count;
        // C
        let color_channel_count = field.color_channel_count();
        // K
        let channel_count = mode.channel_count(color_channel_count);

        if point_count == 0 {
            return Err(Error::Validation(
                "the count of rays and samples".into(),
                "positive".into(),
            ));
        }
        if dim_position != self.position_encoder.config.input_dims {
            return Err(Error::MismatchedChannelCount {
                name: "positions".into(),
                expected: self.position_encoder.config.input_dims,
                actual: dim_position,
            });
        }

        // [R * S, 3]
        let positions = input.positions.reshape([point_count, dim_position]);

        // [R * S, 3] <- [R, 3]
        let directions = match mode {
            QueryMode::Density => None,
            QueryMode::Static | QueryMode::Transient => {
                let [direction_count, dim_direction] = input.directions.dims();
                if direction_count != ray_count {
                    return Err(Error::Validation(
                        "the count of directions".into(),
                        format!("{ray_count}, but got {direction_count}"),
                    ));
                }
                if dim_direction != self.direction_encoder.config.input_dims {
                    return Err(Error::MismatchedChannelCount {
                        name: "directions".into(),
                        expected: self.direction_encoder.config.input_dims,
                        actual: dim_direction,
                    });
                }
                Some(
                    input
                        .directions
                        .unsqueeze_dim::<3>(1)
                        .expand([ray_count, sample_count, dim_direction])
                        .reshape([point_count, dim_direction]),
                )
            },
        };

        let mut outputs = Vec::with_capacity(point_count.div_ceil(self.chunk_size));
        for start in (0..point_count).step_by(self.chunk_size) {
            let length = self.chunk_size.min(point_count - start);

            let mut encodings = Vec::with_capacity(2);
            encodings.push(self.position_encoder.encode(
                positions.to_owned().narrow(0, start, length),
                input.epoch,
            )?);
            if let Some(directions) = &directions {
                encodings.push(self.direction_encoder.encode(
                    directions.to_owned().narrow(0, start, length),
                    input.epoch,
                )?);
            }

            let output = field.forward(Tensor::cat(encodings, 1), mode);
            let [output_count, output_channel_count] = output.dims();
            if output_channel_count != channel_count {
                return Err(Error::MismatchedChannelCount {
                    name: format!("predictions in {mode:?} mode"),
                    expected: channel_count,
                    actual: output_channel_count,
                });
            }
            if output_count != length {
                return Err(Error::Validation(
                    "the count of predictions".into(),
                    format!("{length}, but got {output_count}"),
                ));
            }
            outputs.push(output);
        }

        // [R, S, K]
        let raw = Tensor::cat(outputs, 0).reshape([
            ray_count,
            sample_count,
            channel_count,
        ]);

        RawSamples::from_packed(raw, mode, color_channel_count)
    }
}
