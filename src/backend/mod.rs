pub use burn::{
    backend::wgpu::{Wgpu, WgpuDevice},
    tensor::backend::{AutodiffBackend, Backend},
};

use burn::backend::autodiff;

pub type Autodiff<B> = autodiff::Autodiff<B>;
