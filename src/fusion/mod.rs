//! Image-space fusion of the composited colors and features.

pub mod config;

pub use crate::error::Error;
pub use burn::{
    config::Config,
    module::Module,
    nn::{conv::Conv2d, BatchNorm, Relu},
    tensor::{backend::Backend, Tensor},
};
pub use config::*;

use humansize::{format_size, BINARY};
use std::fmt;

/// Per-channel mean of the RGB colors.
pub const RGB_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel standard deviation of the RGB colors.
pub const RGB_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Convolutional refinement of the feature maps.
///
/// `BN(Conv5x5(ReLU(Conv3x3(ReLU(Conv3x3(ReLU(Conv3x3(input))))))))`
#[derive(Module)]
pub struct FusionNet<B: Backend> {
    /// The 1st convolution.
    pub conv1: Conv2d<B>,
    /// The 2nd convolution.
    pub conv2: Conv2d<B>,
    /// The 3rd convolution.
    pub conv3: Conv2d<B>,
    /// The output convolution.
    pub conv_out: Conv2d<B>,
    /// The ReLU activation after each hidden convolution.
    pub activation: Relu,
    /// The optional trailing normalization.
    pub norm: Option<BatchNorm<B, 2>>,
    /// `F`
    pub dim_feature: usize,
    /// Adding the input features back to the output.
    pub residual: bool,
}

/// The outputs of [`FusionNet::fuse`].
#[derive(Clone)]
pub struct FusionOutput<B: Backend> {
    /// `[B, 3, H, W]`
    pub colors_rgb_2d: Tensor<B, 4>,
    /// `[B, F, H, W]`
    pub features_2d: Tensor<B, 4>,
    /// `[B, F, H, W]`
    pub features_fused: Tensor<B, 4>,
}

impl<B: Backend> FusionNet<B> {
    /// Fusing the per-ray colors and features of whole images.
    ///
    /// ## Shapes
    ///
    /// * `colors_rgb` - `[R, 3]`, where `R` is `B * H * W`
    /// * `features` - `[R, F]`
    ///
    /// The rays are ordered by image, then by row, then by column.
    pub fn fuse(
        &self,
        colors_rgb: Tensor<B, 2>,
        features: Tensor<B, 2>,
        image_height: usize,
        image_width: usize,
        batch_size: usize,
    ) -> Result<FusionOutput<B>, Error> {
        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(target: "radiance_compositor::fusion", "fuse");

        let ray_count = batch_size * image_height * image_width;
        let [color_count, dim_color] = colors_rgb.dims();
        let [feature_count, dim_feature] = features.dims();

        if ray_count == 0 {
            return Err(Error::Validation(
                "the batch size and image size".into(),
                "positive".into(),
            ));
        }
        if color_count != ray_count || feature_count != ray_count {
            return Err(Error::Validation(
                "the count of rays".into(),
                format!(
                    "{ray_count}, but got {color_count} colors \
                     and {feature_count} features"
                ),
            ));
        }
        if dim_color != 3 {
            return Err(Error::MismatchedChannelCount {
                name: "colors_rgb".into(),
                expected: 3,
                actual: dim_color,
            });
        }
        if dim_feature != self.dim_feature {
            return Err(Error::MismatchedChannelCount {
                name: "features".into(),
                expected: self.dim_feature,
                actual: dim_feature,
            });
        }

        // [B, 3, H, W]
        let colors_rgb_2d = nhwc_to_nchw(colors_rgb.reshape([
            batch_size,
            image_height,
            image_width,
            3,
        ]));
        // [B, F, H, W]
        let features_2d = nhwc_to_nchw(features.reshape([
            batch_size,
            image_height,
            image_width,
            dim_feature,
        ]));
        let features_fused = self.forward(Tensor::cat(
            vec![colors_rgb_2d.to_owned(), features_2d.to_owned()],
            1,
        ));

        Ok(FusionOutput {
            colors_rgb_2d,
            features_2d,
            features_fused,
        })
    }

    /// Applies the forward pass on the input tensor.
    ///
    /// ## Shapes
    ///
    /// * `input` - `[B, 3 + F, H, W]`
    /// * `output` - `[B, F, H, W]`
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        let colors_rgb = normalize_rgb(input.to_owned().narrow(1, 0, 3));
        let features = input.narrow(1, 3, self.dim_feature);

        let mut output = Tensor::cat(vec![colors_rgb, features.to_owned()], 1);
        output = self.conv1.forward(output);
        output = self.activation.forward(output);
        output = self.conv2.forward(output);
        output = self.activation.forward(output);
        output = self.conv3.forward(output);
        output = self.activation.forward(output);
        output = self.conv_out.forward(output);
        if let Some(norm) = &self.norm {
            output = norm.forward(output);
        }
        if self.residual {
            output = output + features;
        }
        output
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

/// Standardizing the RGB channels with [`RGB_MEAN`] and [`RGB_STD`].
///
/// ## Shapes
///
/// * `input` - `[B, 3, H, W]`
pub fn normalize_rgb<B: Backend>(input: Tensor<B, 4>) -> Tensor<B, 4> {
    let device = &input.device();
    let mean = Tensor::<B, 1>::from_floats(RGB_MEAN, device).reshape([1, 3, 1, 1]);
    let std = Tensor::<B, 1>::from_floats(RGB_STD, device).reshape([1, 3, 1, 1]);
    (input - mean) / std
}

/// `[B, H, W, C] -> [B, C, H, W]`
#[inline]
pub fn nhwc_to_nchw<B: Backend>(input: Tensor<B, 4>) -> Tensor<B, 4> {
    input.permute([0, 3, 1, 2])
}

impl<B: Backend> fmt::Debug for FusionNet<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct(&format!("FusionNet<{}>", B::name()))
            .field("dim_feature", &self.dim_feature)
            .field("batch_norm", &self.norm.is_some())
            .field("residual", &self.residual)
            .field("size", &self.size_readable())
            .finish()
    }
}
