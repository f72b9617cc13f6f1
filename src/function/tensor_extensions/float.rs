use burn::tensor::{backend, Float, Tensor};

pub trait TensorFloatExtension {
    /// `[x_0, x_1, ..., x_n] -> [1, x_0, x_0 * x_1, ..., x_0 * ... * x_(n-1)]`
    fn prod_cumulative_exclusive(
        self,
        dim: usize,
    ) -> Self;

    /// `[x_0, x_1, ..., x_n] -> [x_1 - x_0, ..., x_n - x_(n-1), tail]`
    fn diff_with_tail(
        self,
        dim: usize,
        tail: f64,
    ) -> Self;
}

impl<B: backend::Backend, const D: usize> TensorFloatExtension
    for Tensor<B, D, Float>
{
    fn prod_cumulative_exclusive(
        self,
        dim: usize,
    ) -> Self {
        assert!(dim < D, "dim should be less than self.dims().len()");

        let dims_batch = {
            let mut dims = self.dims();
            dims[dim] = 1;
            dims
        };
        let mut state_batch = Tensor::ones(dims_batch, &self.device());
        let mut products = Vec::with_capacity(self.dims()[dim]);

        for value_batch in self.iter_dim(dim) {
            products.push(state_batch.to_owned());
            state_batch = state_batch * value_batch;
        }

        Tensor::cat(products, dim)
    }

    fn diff_with_tail(
        self,
        dim: usize,
        tail: f64,
    ) -> Self {
        assert!(dim < D, "dim should be less than self.dims().len()");

        let count = self.dims()[dim];
        let dims_tail = {
            let mut dims = self.dims();
            dims[dim] = 1;
            dims
        };
        let tail = Tensor::full(dims_tail, tail, &self.device());
        if count < 2 {
            return tail;
        }

        let heads = self.to_owned().narrow(dim, 0, count - 1);
        let tails = self.narrow(dim, 1, count - 1);
        Tensor::cat(vec![tails - heads, tail], dim)
    }
}
