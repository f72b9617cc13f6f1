//! Per-sample raw predictions.

pub use super::*;

/// Raw predictions of the samples along the rays.
///
/// - `R` is the count of rays.
/// - `S` is the count of samples per ray.
/// - `C` is the count of static color channels, which is `3 + F`,
///   where `F` is the count of auxiliary feature channels.
#[derive(Clone, Debug)]
pub enum RawSamples<B: Backend> {
    Density {
        /// `[R, S]`
        densities: Tensor<B, 2>,
    },
    Static {
        /// `[R, S, C]`
        colors: Tensor<B, 3>,
        /// `[R, S]`
        densities: Tensor<B, 2>,
    },
    Transient {
        /// `[R, S, C]`
        colors: Tensor<B, 3>,
        /// `[R, S]`
        densities: Tensor<B, 2>,
        /// `[R, S, 3]`
        transient_colors: Tensor<B, 3>,
        /// `[R, S]`
        transient_densities: Tensor<B, 2>,
        /// `[R, S]`
        transient_betas: Tensor<B, 2>,
    },
}

impl<B: Backend> RawSamples<B> {
    /// Splitting the packed predictions.
    ///
    /// ## Shapes
    ///
    /// * `raw` - `[R, S, K]`, where `K` is [`QueryMode::channel_count`]
    pub fn from_packed(
        raw: Tensor<B, 3>,
        mode: QueryMode,
        color_channel_count: usize,
    ) -> Result<Self, Error> {
        // C
        let c = color_channel_count;
        let channel_count = mode.channel_count(c);
        let channel_count_raw = raw.dims()[2];

        if channel_count_raw != channel_count {
            return Err(Error::MismatchedChannelCount {
                name: format!("raw samples in {mode:?} mode"),
                expected: channel_count,
                actual: channel_count_raw,
            });
        }
        if mode != QueryMode::Density && c < 3 {
            return Err(Error::Validation(
                "color_channel_count".into(),
                format!("at least 3, but got {c}"),
            ));
        }

        let channel =
            |start: usize| raw.to_owned().narrow(2, start, 1).squeeze::<2>(2);

        Ok(match mode {
            QueryMode::Density => Self::Density {
                densities: channel(0),
            },
            QueryMode::Static => Self::Static {
                colors: raw.to_owned().narrow(2, 0, c),
                densities: channel(c),
            },
            QueryMode::Transient => Self::Transient {
                colors: raw.to_owned().narrow(2, 0, c),
                densities: channel(c),
                transient_colors: raw.to_owned().narrow(2, c + 1, 3),
                transient_densities: channel(c + 4),
                transient_betas: channel(c + 5),
            },
        })
    }

    /// The static densities.
    #[inline]
    pub fn densities(&self) -> &Tensor<B, 2> {
        match self {
            Self::Density { densities }
            | Self::Static { densities, .. }
            | Self::Transient { densities, .. } => densities,
        }
    }

    /// `[R, S]`
    #[inline]
    pub fn dims(&self) -> [usize; 2] {
        self.densities().dims()
    }

    /// The layout of the samples.
    #[inline]
    pub fn mode(&self) -> QueryMode {
        match self {
            Self::Density { .. } => QueryMode::Density,
            Self::Static { .. } => QueryMode::Static,
            Self::Transient { .. } => QueryMode::Transient,
        }
    }

    /// `C`, if any colors are present.
    #[inline]
    pub fn color_channel_count(&self) -> Option<usize> {
        match self {
            Self::Density { .. } => None,
            Self::Static { colors, .. } | Self::Transient { colors, .. } => {
                Some(colors.dims()[2])
            },
        }
    }

    /// Checking that all attributes share the ray and sample counts.
    pub fn validate(&self) -> Result<(), Error> {
        let [ray_count, sample_count] = self.dims();

        if ray_count == 0 || sample_count == 0 {
            return Err(Error::Validation(
                "the count of rays and samples".into(),
                "positive".into(),
            ));
        }

        let check = |name: &str, dims: &[usize]| {
            if dims[0] != ray_count || dims[1] != sample_count {
                return Err(Error::Validation(
                    format!("the leading dimensions of {name}"),
                    format!("[{ray_count}, {sample_count}], but got {dims:?}"),
                ));
            }
            Ok(())
        };

        match self {
            Self::Density { .. } => {},
            Self::Static { colors, .. } => {
                check("colors", &colors.dims())?;
            },
            Self::Transient {
                colors,
                transient_colors,
                transient_densities,
                transient_betas,
                ..
            } => {
                check("colors", &colors.dims())?;
                check("transient_colors", &transient_colors.dims())?;
                check("transient_densities", &transient_densities.dims())?;
                check("transient_betas", &transient_betas.dims())?;

                let channel_count = transient_colors.dims()[2];
                if channel_count != 3 {
                    return Err(Error::MismatchedChannelCount {
                        name: "transient_colors".into(),
                        expected: 3,
                        actual: channel_count,
                    });
                }
            },
        }

        match self.color_channel_count() {
            Some(channel_count) if channel_count < 3 => Err(Error::Validation(
                "the count of color channels".into(),
                format!("at least 3, but got {channel_count}"),
            )),
            _ => Ok(()),
        }
    }
}
