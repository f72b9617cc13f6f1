//! Volume compositing of the samples along rays.

pub mod config;
pub mod mode;
pub mod samples;

pub use crate::{error::Error, query::QueryMode};
pub use burn::{
    config::Config,
    tensor::{backend::Backend, Distribution, Tensor},
};
pub use config::*;
pub use mode::*;
pub use samples::*;

use crate::function::TensorFloatExtension;
use std::fmt;

/// Volume compositor.
#[derive(Clone, Debug)]
pub struct VolumeCompositor {
    /// The configuration.
    pub config: VolumeCompositorConfig,
}

/// The outputs of [`VolumeCompositor::composite`].
#[derive(Clone)]
pub struct CompositeOutput<B: Backend> {
    /// `[R]`
    ///
    /// The accumulated opacities, which range from `0.0` to `1.0`.
    pub opacities: Tensor<B, 1>,
    /// `[R, S]`
    ///
    /// The probability that each ray terminates at each sample.
    pub weights: Tensor<B, 2>,
    /// It is `None` in [`CompositeMode::DensityOnly`].
    pub radiance: Option<RadianceOutput<B>>,
    /// `[R, S]`
    ///
    /// The raw transient densities, which are surfaced for downstream losses.
    pub transient_densities: Option<Tensor<B, 2>>,
}

/// The per-ray estimates besides opacities.
#[derive(Clone)]
pub struct RadianceOutput<B: Backend> {
    /// `[R, 3]`
    pub colors_rgb: Tensor<B, 2>,
    /// `[R]`
    pub depths: Tensor<B, 1>,
    /// `[R]`
    pub disparities: Tensor<B, 1>,
    /// `[R, F]`
    ///
    /// It is `None` if the colors have no auxiliary channels.
    pub features: Option<Tensor<B, 2>>,
    /// `[R]`
    ///
    /// It is zero-filled without transient components.
    pub uncertainties: Tensor<B, 1>,
}

impl VolumeCompositor {
    /// Compositing the raw samples into per-ray estimates.
    ///
    /// ## Shapes
    ///
    /// * `depths` - `[R, S]`, which are increasing along each ray.
    ///
    /// ## Details
    ///
    /// The auxiliary features are integrated with detached weights,
    /// so they never propagate gradients into the densities.
    pub fn composite<B: Backend>(
        &self,
        samples: RawSamples<B>,
        depths: Tensor<B, 2>,
        mode: CompositeMode,
    ) -> Result<CompositeOutput<B>, Error> {
        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "radiance_compositor::render::volume",
            "composite ({mode:?})",
        );

        samples.validate()?;
        let dims = samples.dims();
        if depths.dims() != dims {
            return Err(Error::Validation(
                "the dimensions of depths".into(),
                format!("{dims:?}, but got {:?}", depths.dims()),
            ));
        }

        // [R, S]
        let deltas = depths.to_owned().diff_with_tail(1, self.config.delta_far);

        match (mode, samples) {
            (CompositeMode::DensityOnly, samples) => {
                let densities = self.perturb(samples.densities().to_owned());
                let weights = weights(alphas(densities, deltas));
                let opacities = weights.to_owned().sum_dim(1).squeeze::<1>(1);

                Ok(CompositeOutput {
                    opacities,
                    weights,
                    radiance: None,
                    transient_densities: None,
                })
            },

            (
                CompositeMode::NoTransient,
                RawSamples::Static { colors, densities },
            ) => {
                let densities = self.perturb(densities);
                let weights = weights(alphas(densities, deltas));
                let opacities = weights.to_owned().sum_dim(1).squeeze::<1>(1);

                let (mut colors_rgb, features) = integrate_colors(&weights, colors);
                if self.config.white_background {
                    colors_rgb = colors_rgb + fill(&opacities);
                }

                let (depths, disparities) = self.depths(&weights, depths);
                let uncertainties = opacities.zeros_like();

                Ok(CompositeOutput {
                    opacities,
                    weights,
                    radiance: Some(RadianceOutput {
                        colors_rgb,
                        depths,
                        disparities,
                        features,
                        uncertainties,
                    }),
                    transient_densities: None,
                })
            },

            (
                CompositeMode::StaticOnlyTest,
                RawSamples::Transient {
                    colors,
                    densities,
                    transient_densities,
                    ..
                },
            ) => {
                // The opacities are still accumulated from both fields.
                let opacities = weights(alphas(
                    densities.to_owned() + transient_densities.to_owned(),
                    deltas.to_owned(),
                ))
                .sum_dim(1)
                .squeeze::<1>(1);

                // Transient components are assumed absent at test time.
                // The background is never filled.
                let weights_static = weights(alphas(densities, deltas));
                let (colors_rgb, features) =
                    integrate_colors(&weights_static, colors);

                let (depths, disparities) = self.depths(&weights_static, depths);
                let uncertainties = opacities.zeros_like();

                Ok(CompositeOutput {
                    opacities,
                    weights: weights_static,
                    radiance: Some(RadianceOutput {
                        colors_rgb,
                        depths,
                        disparities,
                        features,
                        uncertainties,
                    }),
                    transient_densities: Some(transient_densities),
                })
            },

            (
                CompositeMode::TrainingWithTransient,
                RawSamples::Transient {
                    colors,
                    densities,
                    transient_colors,
                    transient_densities,
                    transient_betas,
                },
            ) => {
                let alphas_static = alphas(densities.to_owned(), deltas.to_owned());
                let alphas_transient =
                    alphas(transient_densities.to_owned(), deltas.to_owned());
                let alphas =
                    alphas(densities + transient_densities.to_owned(), deltas);

                // Both fields attenuate the light identically.
                let transmittances = transmittances(alphas.to_owned());
                let weights = alphas * transmittances.to_owned();
                let weights_static = alphas_static * transmittances.to_owned();
                let weights_transient = alphas_transient * transmittances;
                let opacities = weights.to_owned().sum_dim(1).squeeze::<1>(1);

                let (mut colors_rgb_static, features) =
                    integrate_colors(&weights_static, colors);
                if self.config.white_background {
                    colors_rgb_static = colors_rgb_static + fill(&opacities);
                }
                let colors_rgb_transient =
                    integrate(weights_transient.to_owned(), transient_colors);
                let colors_rgb = colors_rgb_static + colors_rgb_transient;

                let uncertainties = (weights_transient * transient_betas)
                    .sum_dim(1)
                    .squeeze::<1>(1)
                    .add_scalar(self.config.beta_min);
                check_uncertainties(&uncertainties)?;

                let (depths, disparities) = self.depths(&weights, depths);

                Ok(CompositeOutput {
                    opacities,
                    weights,
                    radiance: Some(RadianceOutput {
                        colors_rgb,
                        depths,
                        disparities,
                        features,
                        uncertainties,
                    }),
                    transient_densities: Some(transient_densities),
                })
            },

            (
                mode @ (CompositeMode::StaticOnlyTest
                | CompositeMode::TrainingWithTransient),
                _,
            ) => Err(Error::MissingTransient(format!("{mode:?} mode"))),

            (mode, samples) => Err(Error::MismatchedRawSamples {
                mode: format!("{mode:?}"),
                layout: format!("{:?}", samples.mode()),
            }),
        }
    }

    /// Adding Gaussian noise to the densities if enabled.
    fn perturb<B: Backend>(
        &self,
        densities: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        let std = self.config.raw_noise_std;
        if std == 0.0 {
            return densities;
        }
        let noises = densities.random_like(Distribution::Normal(0.0, std));
        densities + noises
    }

    /// `(sum(w * z), 1 / max(eps, sum(w * z) / sum(w)))`
    fn depths<B: Backend>(
        &self,
        weights: &Tensor<B, 2>,
        depths: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let eps = self.config.disparity_epsilon;
        let weights_sum = weights.to_owned().sum_dim(1).squeeze::<1>(1);
        let depths = (weights.to_owned() * depths).sum_dim(1).squeeze::<1>(1);
        let disparities = depths
            .to_owned()
            .div(weights_sum.clamp_min(eps))
            .clamp_min(eps)
            .recip();
        (depths, disparities)
    }
}

/// `1 - exp(-delta * density)`
///
/// ## Shapes
///
/// * `densities` - `[R, S]`
/// * `deltas` - `[R, S]`
pub fn alphas<B: Backend>(
    densities: Tensor<B, 2>,
    deltas: Tensor<B, 2>,
) -> Tensor<B, 2> {
    -(-(deltas * densities)).exp() + 1.0
}

/// The exclusive cumulative product of `1 - alpha` along the samples.
///
/// The first sample is always unoccluded.
pub fn transmittances<B: Backend>(alphas: Tensor<B, 2>) -> Tensor<B, 2> {
    (-alphas + 1.0).prod_cumulative_exclusive(1)
}

/// `alpha * transmittance`
pub fn weights<B: Backend>(alphas: Tensor<B, 2>) -> Tensor<B, 2> {
    alphas.to_owned() * transmittances(alphas)
}

/// `[R, S] x [R, S, C] -> [R, C]`
fn integrate<B: Backend>(
    weights: Tensor<B, 2>,
    values: Tensor<B, 3>,
) -> Tensor<B, 2> {
    (weights.unsqueeze_dim::<3>(2) * values)
        .sum_dim(1)
        .squeeze(1)
}

/// Integrating RGB with the weights and the auxiliary features with detached ones.
fn integrate_colors<B: Backend>(
    weights: &Tensor<B, 2>,
    colors: Tensor<B, 3>,
) -> (Tensor<B, 2>, Option<Tensor<B, 2>>) {
    let channel_count = colors.dims()[2];
    let colors_rgb =
        integrate(weights.to_owned(), colors.to_owned().narrow(2, 0, 3));
    let features = (channel_count > 3).then(|| {
        integrate(
            weights.to_owned().detach(),
            colors.narrow(2, 3, channel_count - 3),
        )
    });
    (colors_rgb, features)
}

/// `[R] -> [R, 1]`, the remaining transmittance.
fn fill<B: Backend>(opacities: &Tensor<B, 1>) -> Tensor<B, 2> {
    (-opacities.to_owned() + 1.0).unsqueeze_dim(1)
}

fn check_uncertainties<B: Backend>(
    uncertainties: &Tensor<B, 1>
) -> Result<(), Error> {
    let data = uncertainties.to_data();
    let invalid = data
        .iter::<f32>()
        .find(|uncertainty| !uncertainty.is_finite() || *uncertainty < 0.0);

    if let Some(uncertainty) = invalid {
        log::error!(
            target: "radiance_compositor::render::volume",
            "Uncertainty diverged to {uncertainty}",
        );
        return Err(Error::NumericalDivergence(format!(
            "uncertainty should be finite and non-negative, but got {uncertainty}"
        )));
    }

    Ok(())
}

impl<B: Backend> fmt::Debug for CompositeOutput<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("CompositeOutput<{}>", B::name()))
            .field("opacities.dims()", &self.opacities.dims())
            .field("weights.dims()", &self.weights.dims())
            .field("radiance", &self.radiance)
            .field(
                "transient_densities.dims()",
                &self.transient_densities.as_ref().map(Tensor::dims),
            )
            .finish()
    }
}

impl<B: Backend> fmt::Debug for RadianceOutput<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("RadianceOutput<{}>", B::name()))
            .field("colors_rgb.dims()", &self.colors_rgb.dims())
            .field("depths.dims()", &self.depths.dims())
            .field("disparities.dims()", &self.disparities.dims())
            .field("features.dims()", &self.features.as_ref().map(Tensor::dims))
            .field("uncertainties.dims()", &self.uncertainties.dims())
            .finish()
    }
}
