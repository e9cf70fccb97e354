use std::ops::{Deref, DerefMut};

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::layers::Layer;
use crate::{MlErr, Result};

/// A sequential model: information flows forward when computing an output and
/// backward when computing the *deltas* of its layers.
///
/// Parameters are owned by the caller as one flat slice; each layer views its
/// own sub-slice through an offset cursor.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
    training: bool,
}

impl Sequential {
    /// Creates a new `Sequential` in training mode.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        Self {
            layers: layers.into_iter().collect(),
            training: true,
        }
    }

    /// The amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(|layer| layer.size()).sum()
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Switches between training mode (forward passes keep the metadata
    /// `backward` needs) and evaluation mode (no gradient bookkeeping).
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `params` - The model's flat parameter slice.
    /// * `x` - The input batch, one example per row.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward<'x>(
        &'x mut self,
        params: &[f32],
        mut x: ArrayView2<'x, f32>,
    ) -> Result<ArrayView2<'x, f32>> {
        self.check_len("params", params.len())?;

        let training = self.training;
        let mut offset = 0;

        for layer in &mut self.layers {
            let size = layer.size();
            x = layer.forward(&params[offset..offset + size], x, training)?;
            offset += size;
        }

        Ok(x)
    }

    /// Walks the layers in reverse, accumulating the full parameter gradient
    /// into `grad` from the loss delta of the last forward pass.
    ///
    /// # Arguments
    /// * `params` - The model's flat parameter slice.
    /// * `grad` - The gradient buffer, one slot per parameter.
    /// * `delta` - The loss derivative with respect to the model output.
    pub fn backward(&mut self, params: &[f32], grad: &mut [f32], delta: Array2<f32>) -> Result<()> {
        self.check_len("params", params.len())?;
        self.check_len("grad", grad.len())?;

        let mut d = delta;
        let mut offset = self.size();

        for layer in self.layers.iter_mut().rev() {
            let size = layer.size();
            offset -= size;
            d = layer.backward(
                &params[offset..offset + size],
                &mut grad[offset..offset + size],
                d,
            )?;
        }

        Ok(())
    }

    /// Returns a freshly initialized flat parameter vector for this model.
    pub fn init_params<R: Rng>(&self, rng: &mut R) -> Vec<f32> {
        let mut params = vec![0.; self.size()];
        let mut offset = 0;

        for layer in &self.layers {
            let size = layer.size();
            layer.init_params(&mut params[offset..offset + size], rng);
            offset += size;
        }

        params
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        let expected = self.size();
        if got != expected {
            return Err(MlErr::ShapeMismatch {
                what,
                got,
                expected,
            });
        }
        Ok(())
    }
}

/// Scoped evaluation mode.
///
/// Flips the model out of training mode on creation and restores whatever
/// mode it was in when dropped, including on early returns.
pub struct EvalGuard<'m> {
    model: &'m mut Sequential,
    was_training: bool,
}

impl<'m> EvalGuard<'m> {
    pub fn new(model: &'m mut Sequential) -> Self {
        let was_training = model.is_training();
        model.set_training(false);
        Self {
            model,
            was_training,
        }
    }
}

impl Deref for EvalGuard<'_> {
    type Target = Sequential;

    fn deref(&self) -> &Sequential {
        self.model
    }
}

impl DerefMut for EvalGuard<'_> {
    fn deref_mut(&mut self) -> &mut Sequential {
        self.model
    }
}

impl Drop for EvalGuard<'_> {
    fn drop(&mut self) {
        self.model.set_training(self.was_training);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arch::activations::ActFn;
    use ndarray::array;

    #[test]
    fn test_size_sums_layers() {
        let model = Sequential::new([
            Layer::dense((2, 3), Some(ActFn::relu())),
            Layer::dense((3, 1), None),
        ]);

        assert_eq!(model.size(), 9 + 4);
    }

    #[test]
    fn test_forward_rejects_wrong_param_count() {
        let mut model = Sequential::new([Layer::dense((2, 1), None)]);
        let x = array![[1., 2.]];

        let err = model.forward(&[0.; 2], x.view()).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { what: "params", .. }));
    }

    #[test]
    fn test_forward_chains_layers() {
        let mut model = Sequential::new([
            Layer::dense((2, 2), None),
            Layer::dense((2, 1), None),
        ]);
        // first layer: identity, no bias; second: sum both columns, bias 1
        let params = [1., 0., 0., 1., 0., 0., 1., 1., 1.];
        let x = array![[2., 3.]];

        let y = model.forward(&params, x.view()).unwrap();
        assert_eq!(y, array![[6.]]);
    }

    #[test]
    fn test_eval_guard_restores_previous_mode() {
        let mut model = Sequential::new([Layer::dense((2, 1), None)]);
        assert!(model.is_training());

        {
            let guard = EvalGuard::new(&mut model);
            assert!(!guard.is_training());
        }
        assert!(model.is_training());

        model.set_training(false);
        {
            let _guard = EvalGuard::new(&mut model);
        }
        assert!(!model.is_training());
    }

    #[test]
    fn test_init_params_matches_size() {
        let model = Sequential::new([
            Layer::dense((4, 3), Some(ActFn::relu())),
            Layer::dense((3, 2), None),
        ]);

        let params = model.init_params(&mut rand::rng());
        assert_eq!(params.len(), model.size());
    }
}
