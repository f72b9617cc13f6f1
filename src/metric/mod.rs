//! Image metrics for view evaluation.

pub use burn::tensor::{backend::Backend, Tensor};

use std::f64::consts::LN_10;

/// `mean((output - target)^2)`
///
/// ## Shapes
///
/// * `output` - `[...]`
/// * `target` - `[...]`
/// * *return* - `[1]`
pub fn mean_squared_error<B: Backend, const D: usize>(
    output: Tensor<B, D>,
    target: Tensor<B, D>,
) -> Tensor<B, 1> {
    (output - target).powf_scalar(2.0).mean()
}

/// `-10 * log10(mse)`
pub fn psnr_from_mse<B: Backend>(mse: Tensor<B, 1>) -> Tensor<B, 1> {
    mse.log().mul_scalar(-10.0 / LN_10)
}

/// Converting colors to 8-bit values.
///
/// The colors are clamped to `[0, 1]`, scaled by `255` and truncated.
pub fn to_rgb8<B: Backend, const D: usize>(colors: Tensor<B, D>) -> Vec<u8> {
    colors
        .clamp(0.0, 1.0)
        .mul_scalar(255.0)
        .into_data()
        .iter::<f32>()
        .map(|value| value as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn mean_squared_error_and_psnr() {
        let device = &Default::default();

        let output = Tensor::<B, 2>::from_floats([[0.0, 0.5], [1.0, 0.2]], device);
        let target = Tensor::<B, 2>::from_floats([[0.0, 0.3], [0.8, 0.2]], device);
        let mse = mean_squared_error(output, target);
        mse.into_data().assert_approx_eq(
            &Tensor::<B, 1>::from_floats([0.02], device).into_data(),
            6,
        );

        let psnr = psnr_from_mse(Tensor::<B, 1>::from_floats([0.01, 1.0], device));
        psnr.into_data().assert_approx_eq(
            &Tensor::<B, 1>::from_floats([20.0, 0.0], device).into_data(),
            4,
        );
    }

    #[test]
    fn to_rgb8_clamps_and_truncates() {
        let device = &Default::default();

        let colors = Tensor::<B, 2>::from_floats(
            [[-0.5, 0.0, 0.5], [0.999, 1.0, 2.0]],
            device,
        );
        assert_eq!(to_rgb8(colors), vec![0, 0, 127, 254, 255, 255]);
    }
}
