pub mod volume;

pub use volume::{
    CompositeMode, CompositeOutput, FieldKind, PassOptions, RadianceOutput,
    RawSamples, VolumeCompositor, VolumeCompositorConfig,
};
