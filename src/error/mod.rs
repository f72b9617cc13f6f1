#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation Error: {0} should be {1}")]
    Validation(String, String),

    #[error("Mismatched channel count of {name}: {actual} instead of {expected}")]
    MismatchedChannelCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Mismatched raw samples: {layout} samples in {mode} mode")]
    MismatchedRawSamples { mode: String, layout: String },

    #[error("Missing transient channels in {0}")]
    MissingTransient(String),

    #[error("Numerical divergence: {0}")]
    NumericalDivergence(String),

    #[error("Progressive horizon error: {0}")]
    ProgressiveHorizon(String),
}
