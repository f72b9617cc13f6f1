//! Per-image affine color correction driven by exposure histograms.

pub mod net;

pub use crate::error::Error;
pub use burn::{
    config::Config,
    module::Module,
    tensor::{activation::sigmoid, backend::Backend, Tensor},
};
pub use net::*;

/// The width of an exposure embedding, a `3 x 3` kernel followed by a 3-vector bias.
pub const EXPOSURE_EMBEDDING_DIM: usize = 9 + 3;

/// Maps exposure histograms to affine color transforms.
pub trait ExposureEmbedding<B: Backend> {
    /// Embeds the histograms.
    ///
    /// ## Shapes
    ///
    /// * `histograms` - `[B, H]`
    /// * `output` - `[B, 12]`
    fn embed(
        &self,
        histograms: Tensor<B, 2>,
    ) -> Tensor<B, 2>;

    /// Correcting the colors by `sigmoid(kernel @ rgb + bias)` per image.
    ///
    /// ## Shapes
    ///
    /// * `colors_rgb` - `[R, 3]`, where `R` is `B * N`
    /// * `histograms` - `[B, H]`
    /// * `output` - `[R, 3]`
    ///
    /// ## Details
    ///
    /// The rays must be grouped contiguously by image,
    /// i.e., the `b`-th run of `N` rays belongs to the `b`-th histogram.
    /// The grouping is not checked, and shuffled rays are silently mis-corrected.
    fn correct(
        &self,
        colors_rgb: Tensor<B, 2>,
        histograms: Tensor<B, 2>,
        batch_size: usize,
    ) -> Result<Tensor<B, 2>, Error> {
        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(target: "radiance_compositor::exposure", "correct");

        let [ray_count, dim_color] = colors_rgb.dims();
        let histogram_count = histograms.dims()[0];

        if dim_color != 3 {
            return Err(Error::MismatchedChannelCount {
                name: "colors_rgb".into(),
                expected: 3,
                actual: dim_color,
            });
        }
        if batch_size == 0 || ray_count % batch_size != 0 {
            return Err(Error::Validation(
                "the count of rays".into(),
                format!(
                    "a multiple of batch size {batch_size}, but got {ray_count}"
                ),
            ));
        }
        if histogram_count != batch_size {
            return Err(Error::Validation(
                "the count of histograms".into(),
                format!("{batch_size}, but got {histogram_count}"),
            ));
        }

        // [B, 12]
        let embeddings = self.embed(histograms);
        let [embedding_count, dim_embedding] = embeddings.dims();
        if dim_embedding != EXPOSURE_EMBEDDING_DIM {
            return Err(Error::MismatchedChannelCount {
                name: "exposure embeddings".into(),
                expected: EXPOSURE_EMBEDDING_DIM,
                actual: dim_embedding,
            });
        }
        if embedding_count != batch_size {
            return Err(Error::Validation(
                "the count of exposure embeddings".into(),
                format!("{batch_size}, but got {embedding_count}"),
            ));
        }

        // N
        let ray_count_per_image = ray_count / batch_size;
        // [B, 3, 3]
        let kernels =
            embeddings.to_owned().narrow(1, 0, 9).reshape([batch_size, 3, 3]);
        // [B, 3, 1]
        let biases = embeddings.narrow(1, 9, 3).reshape([batch_size, 3, 1]);
        // [B, 3, N]
        let colors_rgb = colors_rgb
            .reshape([batch_size, ray_count_per_image, 3])
            .swap_dims(1, 2);

        let colors_rgb = kernels.matmul(colors_rgb) + biases;

        Ok(sigmoid(colors_rgb.swap_dims(1, 2).reshape([ray_count, 3])))
    }
}
