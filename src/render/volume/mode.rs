//! Selection of the composition policy.

pub use super::*;

/// The role of the field in hierarchical sampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldKind {
    /// The field driving importance resampling.
    #[default]
    Coarse,
    /// The field evaluated on the resampled depths.
    Fine,
}

/// The flags of a rendering pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassOptions {
    /// The role of the field.
    pub kind: FieldKind,
    /// Rendering held-out views.
    pub test_time: bool,
    /// Requesting colors from the coarse field at test time.
    pub store_rgb: bool,
    /// The field predicts transient components.
    pub transient: bool,
    /// Keeping transient components at test time.
    pub transient_at_test: bool,
}

/// The composition policy, selected once per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeMode {
    /// Only opacities and weights, for importance resampling.
    DensityOnly,
    /// Static components only, with transmittance from static densities.
    StaticOnlyTest,
    /// Static and transient components composited and summed.
    TrainingWithTransient,
    /// A field without transient components.
    NoTransient,
}

impl CompositeMode {
    /// Selecting the policy from the pass flags.
    pub const fn select(options: &PassOptions) -> Self {
        let is_coarse = matches!(options.kind, FieldKind::Coarse);
        if is_coarse && options.test_time && !options.store_rgb {
            Self::DensityOnly
        } else if !options.transient {
            Self::NoTransient
        } else if options.test_time && !options.transient_at_test {
            Self::StaticOnlyTest
        } else {
            Self::TrainingWithTransient
        }
    }
}

impl From<CompositeMode> for QueryMode {
    #[inline]
    fn from(mode: CompositeMode) -> Self {
        match mode {
            CompositeMode::DensityOnly => QueryMode::Density,
            CompositeMode::NoTransient => QueryMode::Static,
            CompositeMode::StaticOnlyTest | CompositeMode::TrainingWithTransient => {
                QueryMode::Transient
            },
        }
    }
}

impl From<&PassOptions> for CompositeMode {
    #[inline]
    fn from(options: &PassOptions) -> Self {
        Self::select(options)
    }
}
