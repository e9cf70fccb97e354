use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer with an optional activation on top.
///
/// Parameters live in an externally owned flat slice: `dim.0 * dim.1` weights
/// in row-major order followed by `dim.1` biases.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata, only filled while training
    x: Array2<f32>,
    z: Array2<f32>,
    a: Array2<f32>,
}

impl Dense {
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        let zeros = Array2::zeros((0, 0));

        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            x: zeros.clone(),
            z: zeros.clone(),
            a: zeros,
        }
    }

    /// The amount of parameters this layer holds.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Computes `x . w + b` plus the activation, if any.
    ///
    /// In training mode the input is cached for the next `backward` call;
    /// in evaluation mode no gradient bookkeeping happens.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of the model parameters.
    /// * `x` - The input batch, one example per row.
    /// * `train` - Whether forward metadata should be kept.
    ///
    /// # Returns
    /// A view of this layer's output batch.
    pub fn forward<'s>(
        &'s mut self,
        params: &[f32],
        x: ArrayView2<f32>,
        train: bool,
    ) -> Result<ArrayView2<'s, f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::ShapeMismatch {
                what: "dense input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w);
        z += &b;

        if train {
            self.x = x.to_owned();
        }
        self.z = z;

        let Some(act_fn) = &self.act_fn else {
            return Ok(self.z.view());
        };

        self.a = self.z.mapv(|z| act_fn.f(z));
        Ok(self.a.view())
    }

    /// Consumes the delta coming from the next layer, writes this layer's
    /// gradient into `grad` and returns the delta for the previous layer.
    ///
    /// Only valid right after a training-mode `forward` over the same batch.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        if d.ncols() != self.dim.1 {
            return Err(MlErr::ShapeMismatch {
                what: "dense delta",
                got: d.ncols(),
                expected: self.dim.1,
            });
        }
        if self.x.nrows() != d.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "dense batch",
                got: d.nrows(),
                expected: self.x.nrows(),
            });
        }

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        dw.assign(&self.x.t().dot(&d));
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    /// Writes He-style initial weights and zero biases into `params`.
    pub fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) {
        let w_size = self.dim.0 * self.dim.1;
        let fan_in = self.dim.0.max(1) as f32;
        let std = if matches!(self.act_fn, Some(ActFn::Relu(_))) {
            (2. / fan_in).sqrt()
        } else {
            fan_in.sqrt().recip()
        };

        // fan-in is nonzero so the deviation is positive and finite
        let normal = Normal::new(0., std).unwrap();
        for p in &mut params[..w_size] {
            *p = normal.sample(rng);
        }
        params[w_size..].fill(0.);
    }

    /// Gives a view of the raw parameter slice as this layer's weights and biases.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        if params.len() != self.size {
            return Err(MlErr::ShapeMismatch {
                what: "dense params",
                got: params.len(),
                expected: self.size,
            });
        }

        // the length check above makes both reshapes infallible
        let w_size = self.dim.0 * self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let w = ArrayView2::from_shape(self.dim, w_raw).unwrap();
        let b = ArrayView1::from_shape(self.dim.1, b_raw).unwrap();

        Ok((w, b))
    }

    /// Gives a view of the raw gradient slice as this layer's delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        if grad.len() != self.size {
            return Err(MlErr::ShapeMismatch {
                what: "dense grad",
                got: grad.len(),
                expected: self.size,
            });
        }

        // the length check above makes both reshapes infallible
        let w_size = self.dim.0 * self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).unwrap();
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).unwrap();

        Ok((dw, db))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_forward_linear() {
        let mut layer = Dense::new((2, 2), None);
        // identity weights, bias (1, -1)
        let params = [1., 0., 0., 1., 1., -1.];
        let x = array![[2., 3.], [-1., 0.5]];

        let y = layer.forward(&params, x.view(), true).unwrap();
        assert_eq!(y, array![[3., 2.], [0., -0.5]]);
    }

    #[test]
    fn test_forward_rejects_bad_input_width() {
        let mut layer = Dense::new((2, 2), None);
        let params = [0.; 6];
        let x = Array2::<f32>::zeros((1, 3));

        let err = layer.forward(&params, x.view(), true).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { what: "dense input", .. }));
    }

    #[test]
    fn test_backward_grads_match_analytic() {
        let mut layer = Dense::new((2, 2), None);
        let params = [1., 2., 3., 4., 0., 0.];
        let x = array![[1., 2.]];
        layer.forward(&params, x.view(), true).unwrap();

        let mut grad = [0.; 6];
        let d = array![[1., -1.]];
        let d_prev = layer.backward(&params, &mut grad, d).unwrap();

        // dw = x^T . d, db = column sums of d, d_prev = d . w^T
        assert_eq!(grad, [1., -1., 2., -2., 1., -1.]);
        assert_eq!(d_prev, array![[-1., -1.]]);
    }

    #[test]
    fn test_eval_forward_skips_input_cache() {
        let mut layer = Dense::new((2, 1), None);
        let params = [1., 1., 0.];
        let x = array![[1., 1.]];

        layer.forward(&params, x.view(), false).unwrap();
        assert_eq!(layer.x.nrows(), 0);
    }

    #[test]
    fn test_init_params_zeroes_biases() {
        let layer = Dense::new((3, 2), Some(ActFn::relu()));
        let mut params = vec![9.; layer.size()];
        layer.init_params(&mut params, &mut rand::rng());

        assert_eq!(&params[6..], &[0., 0.]);
        assert!(params[..6].iter().any(|&p| p != 9.));
    }
}
