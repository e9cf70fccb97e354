use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::Dense;
use crate::{Result, arch::activations::ActFn};

/// A layer of a sequential model, dispatched by kind.
#[derive(Clone, Debug)]
pub enum Layer {
    Dense(Dense),
}

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    /// The amount of parameters this layer holds.
    pub fn size(&self) -> usize {
        match self {
            Self::Dense(l) => l.size(),
        }
    }

    pub fn forward<'s>(
        &'s mut self,
        params: &[f32],
        x: ArrayView2<f32>,
        train: bool,
    ) -> Result<ArrayView2<'s, f32>> {
        match self {
            Self::Dense(l) => l.forward(params, x, train),
        }
    }

    pub fn backward(&mut self, params: &[f32], grad: &mut [f32], d: Array2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.backward(params, grad, d),
        }
    }

    /// Writes freshly initialized parameters for this layer into `params`.
    pub fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) {
        match self {
            Self::Dense(l) => l.init_params(params, rng),
        }
    }
}
