use burn::{backend::NdArray, tensor::Tensor};
use divan::Bencher;
use radiance_compositor::{
    backend::{Backend, Wgpu},
    encoder::{EncodingPreset, PositionalEncoderConfig},
    render::{CompositeMode, RawSamples, VolumeCompositorConfig},
};

fn main() {
    divan::main();
}

mod cpu {
    use super::*;

    type B = NdArray<f32>;

    #[divan::bench(sample_count = 50, sample_size = 2)]
    fn composite_no_transient(bencher: Bencher) {
        let compositor = VolumeCompositorConfig::default().init().unwrap();

        bencher
            .with_inputs(data::random_samples::<B>(false))
            .bench_local_values(|(samples, depths)| {
                compositor
                    .composite(samples, depths, CompositeMode::NoTransient)
                    .unwrap()
            });
    }

    #[divan::bench(sample_count = 50, sample_size = 2)]
    fn composite_training_with_transient(bencher: Bencher) {
        let compositor = VolumeCompositorConfig::default().init().unwrap();

        bencher
            .with_inputs(data::random_samples::<B>(true))
            .bench_local_values(|(samples, depths)| {
                compositor
                    .composite(samples, depths, CompositeMode::TrainingWithTransient)
                    .unwrap()
            });
    }

    #[divan::bench(sample_count = 50, sample_size = 2)]
    fn encode_positions(bencher: Bencher) {
        let encoder = PositionalEncoderConfig::preset(10, EncodingPreset::Default)
            .init()
            .unwrap();

        bencher
            .with_inputs(data::random_positions::<B>())
            .bench_local_values(|positions| encoder.forward(positions));
    }
}

mod gpu {
    use super::*;

    #[divan::bench(sample_count = 50, sample_size = 2)]
    fn composite_training_with_transient(bencher: Bencher) {
        let compositor = VolumeCompositorConfig::default().init().unwrap();

        bencher
            .with_inputs(data::random_samples::<Wgpu>(true))
            .bench_local_values(|(samples, depths)| {
                let output = compositor
                    .composite(samples, depths, CompositeMode::TrainingWithTransient)
                    .unwrap();
                Wgpu::sync(&Default::default());
                output
            });
    }
}

mod data {
    use super::*;
    use rand::{
        distributions::{Distribution, Uniform},
        rngs::StdRng,
        SeedableRng,
    };

    const RAY_COUNT: usize = 1 << 10;
    const SAMPLE_COUNT: usize = 64;
    const COLOR_CHANNEL_COUNT: usize = 3 + 16;

    fn random_tensor<B: Backend, const D: usize>(
        rng: &mut StdRng,
        shape: [usize; D],
        low: f32,
        high: f32,
    ) -> Tensor<B, D> {
        let values = Uniform::new(low, high)
            .sample_iter(rng)
            .take(shape.iter().product())
            .collect::<Vec<_>>();
        Tensor::<B, 1>::from_floats(values.as_slice(), &Default::default())
            .reshape(shape)
    }

    pub fn random_samples<B: Backend>(
        transient: bool
    ) -> impl Fn() -> (RawSamples<B>, Tensor<B, 2>) {
        move || {
            let rng = &mut StdRng::seed_from_u64(0);
            let shape = [RAY_COUNT, SAMPLE_COUNT];

            let colors = random_tensor(
                rng,
                [RAY_COUNT, SAMPLE_COUNT, COLOR_CHANNEL_COUNT],
                0.0,
                1.0,
            );
            let densities = random_tensor(rng, shape, 0.0, 10.0);
            let samples = if transient {
                RawSamples::Transient {
                    colors,
                    densities,
                    transient_colors: random_tensor(
                        rng,
                        [RAY_COUNT, SAMPLE_COUNT, 3],
                        0.0,
                        1.0,
                    ),
                    transient_densities: random_tensor(rng, shape, 0.0, 10.0),
                    transient_betas: random_tensor(rng, shape, 0.0, 1.0),
                }
            } else {
                RawSamples::Static { colors, densities }
            };

            let depths = random_tensor::<B, 2>(rng, shape, 0.01, 0.1);
            let depths = Tensor::cat(
                (0..SAMPLE_COUNT)
                    .map(|count| {
                        depths.to_owned().narrow(1, 0, count + 1).sum_dim(1)
                    })
                    .collect(),
                1,
            );

            (samples, depths)
        }
    }

    pub fn random_positions<B: Backend>() -> impl Fn() -> Tensor<B, 2> {
        || {
            random_tensor(
                &mut StdRng::seed_from_u64(0),
                [RAY_COUNT * SAMPLE_COUNT, 3],
                -1.0,
                1.0,
            )
        }
    }
}
