use super::Optimizer;
use crate::{MlErr, Result};

/// Adam optimization algorithm.
///
/// Keeps exponentially decayed first and second gradient moments per
/// parameter, with bias correction folded into the step size.
#[derive(Clone, Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    beta1_t: f32,
    beta2_t: f32,
    m: Box<[f32]>,
    v: Box<[f32]>,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            beta1_t: 1.,
            beta2_t: 1.,
            m: vec![0.; len].into_boxed_slice(),
            v: vec![0.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        if grad.len() != params.len() {
            return Err(MlErr::ShapeMismatch {
                what: "grad",
                got: grad.len(),
                expected: params.len(),
            });
        }
        if params.len() != self.m.len() {
            return Err(MlErr::ShapeMismatch {
                what: "params",
                got: params.len(),
                expected: self.m.len(),
            });
        }

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        params
            .iter_mut()
            .zip(grad)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
            .for_each(|(((p, g), m), v)| {
                *m = b1 * *m + (1. - b1) * g;
                *v = b2 * *v + (1. - b2) * g.powi(2);
                *p -= step_size * *m / (v.sqrt() + eps);
            });

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_step_has_learning_rate_magnitude() {
        let mut adam = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [1., -1.];

        adam.update_params(&mut params, &[0.5, -0.5]).unwrap();

        // bias correction makes the very first step ~lr * sign(g)
        assert!((params[0] - 0.9).abs() < 1e-4);
        assert!((params[1] + 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_descends_a_quadratic() {
        let mut adam = Adam::new(1, 0.05, 0.9, 0.999, 1e-8);
        let mut params = [3.];

        for _ in 0..500 {
            let grad = [2. * params[0]];
            adam.update_params(&mut params, &grad).unwrap();
        }

        assert!(params[0].abs() < 0.1, "got {}", params[0]);
    }

    #[test]
    fn test_rejects_grad_length_mismatch() {
        let mut adam = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [0., 0.];

        let err = adam.update_params(&mut params, &[1.]).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { what: "grad", .. }));
    }
}
