//! Volume compositor configuration.

pub use super::*;

/// The configuration for [`VolumeCompositor`].
#[derive(Config, Copy, Debug)]
pub struct VolumeCompositorConfig {
    /// Minimum of the per-ray uncertainty, added after the composition.
    #[config(default = "0.1")]
    pub beta_min: f64,
    /// The width of the last interval, which stands for infinity.
    #[config(default = "1e2")]
    pub delta_far: f64,
    /// Lower bound of the normalized depth in disparity.
    #[config(default = "1e-10")]
    pub disparity_epsilon: f64,
    /// Standard deviation of the Gaussian noise added to densities.
    ///
    /// It is disabled if zero.
    #[config(default = "0.0")]
    pub raw_noise_std: f64,
    /// Filling the remaining transmittance with an opaque white background.
    #[config(default = false)]
    pub white_background: bool,
}

impl VolumeCompositorConfig {
    /// Initialize from the configuration.
    pub fn init(&self) -> Result<VolumeCompositor, Error> {
        if !(self.beta_min.is_finite() && self.beta_min >= 0.0) {
            return Err(Error::Validation(
                "beta_min".into(),
                format!("finite and non-negative, but got {}", self.beta_min),
            ));
        }
        if !(self.delta_far.is_finite() && self.delta_far > 0.0) {
            return Err(Error::Validation(
                "delta_far".into(),
                format!("finite and positive, but got {}", self.delta_far),
            ));
        }
        if !(self.disparity_epsilon.is_finite() && self.disparity_epsilon > 0.0) {
            return Err(Error::Validation(
                "disparity_epsilon".into(),
                format!("finite and positive, but got {}", self.disparity_epsilon),
            ));
        }
        if !(self.raw_noise_std.is_finite() && self.raw_noise_std >= 0.0) {
            return Err(Error::Validation(
                "raw_noise_std".into(),
                format!("finite and non-negative, but got {}", self.raw_noise_std),
            ));
        }

        Ok(VolumeCompositor {
            config: self.to_owned(),
        })
    }
}

impl Default for VolumeCompositorConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn init() {
        use super::*;

        let compositor = VolumeCompositorConfig::default().init().unwrap();
        assert_eq!(compositor.config.beta_min, 0.1);
        assert_eq!(compositor.config.delta_far, 100.0);
        assert_eq!(compositor.config.raw_noise_std, 0.0);
        assert!(!compositor.config.white_background);

        let result = VolumeCompositorConfig::new().with_beta_min(-1.0).init();
        assert!(matches!(result, Err(Error::Validation(_, _))));

        let result = VolumeCompositorConfig::new().with_delta_far(0.0).init();
        assert!(matches!(result, Err(Error::Validation(_, _))));

        let result = VolumeCompositorConfig::new()
            .with_raw_noise_std(f64::NAN)
            .init();
        assert!(matches!(result, Err(Error::Validation(_, _))));
    }
}
