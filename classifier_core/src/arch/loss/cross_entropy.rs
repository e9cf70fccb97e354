use ndarray::{Array2, ArrayView1, ArrayView2};

use super::LossFn;
use crate::{MlErr, Result};

/// Softmax cross-entropy over class logits.
///
/// Targets are class indices, not one-hot rows. Log-sum-exp terms subtract
/// the row maximum so large logits don't overflow.
#[derive(Default, Clone, Copy, Debug)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }

    fn check(logits: ArrayView2<f32>, targets: ArrayView1<usize>) -> Result<()> {
        if logits.nrows() == 0 {
            return Err(MlErr::ShapeMismatch {
                what: "batch",
                got: 0,
                expected: 1,
            });
        }
        if targets.len() != logits.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "targets",
                got: targets.len(),
                expected: logits.nrows(),
            });
        }

        let classes = logits.ncols();
        if let Some(&label) = targets.iter().find(|&&label| label >= classes) {
            return Err(MlErr::LabelOutOfRange { label, classes });
        }

        Ok(())
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, logits: ArrayView2<f32>, targets: ArrayView1<usize>) -> Result<f32> {
        Self::check(logits, targets)?;

        let mut total = 0.;
        for (row, &target) in logits.outer_iter().zip(targets) {
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let lse = row.iter().map(|&z| (z - max).exp()).sum::<f32>().ln();
            total += lse - (row[target] - max);
        }

        Ok(total / logits.nrows() as f32)
    }

    fn loss_prime(
        &self,
        logits: ArrayView2<f32>,
        targets: ArrayView1<usize>,
    ) -> Result<Array2<f32>> {
        Self::check(logits, targets)?;

        let mut d = Array2::zeros(logits.raw_dim());
        let scale = 1. / logits.nrows() as f32;

        for ((row, mut d_row), &target) in logits
            .outer_iter()
            .zip(d.outer_iter_mut())
            .zip(targets)
        {
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let denom = row.iter().map(|&z| (z - max).exp()).sum::<f32>();

            for (&z, d) in row.iter().zip(d_row.iter_mut()) {
                *d = (z - max).exp() / denom * scale;
            }
            d_row[target] -= scale;
        }

        Ok(d)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_uniform_logits_loss_is_ln_classes() {
        let logits = array![[0., 0., 0.], [5., 5., 5.]];
        let targets = array![0, 2];

        let loss = CrossEntropy.loss(logits.view(), targets.view()).unwrap();
        assert!((loss - 3f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_confident_correct_prediction_has_near_zero_loss() {
        let logits = array![[20., 0., 0.]];
        let targets = array![0];

        let loss = CrossEntropy.loss(logits.view(), targets.view()).unwrap();
        assert!(loss >= 0.);
        assert!(loss < 1e-6);
    }

    #[test]
    fn test_loss_is_shift_invariant() {
        let a = array![[1., 2., 3.]];
        let b = array![[101., 102., 103.]];
        let targets = array![1];

        let la = CrossEntropy.loss(a.view(), targets.view()).unwrap();
        let lb = CrossEntropy.loss(b.view(), targets.view()).unwrap();
        assert!((la - lb).abs() < 1e-5);
    }

    #[test]
    fn test_gradient_rows_sum_to_zero() {
        let logits = array![[1., -2., 0.5], [3., 3., -1.]];
        let targets = array![2, 0];

        let d = CrossEntropy
            .loss_prime(logits.view(), targets.view())
            .unwrap();
        for row in d.outer_iter() {
            assert!(row.sum().abs() < 1e-6);
        }
    }

    #[test]
    fn test_rejects_label_out_of_range() {
        let logits = array![[0., 0.]];
        let targets = array![2];

        let err = CrossEntropy.loss(logits.view(), targets.view()).unwrap_err();
        assert!(matches!(err, MlErr::LabelOutOfRange { label: 2, classes: 2 }));
    }

    #[test]
    fn test_rejects_target_length_mismatch() {
        let logits = array![[0., 0.], [0., 0.]];
        let targets = array![1];

        let err = CrossEntropy.loss(logits.view(), targets.view()).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { what: "targets", .. }));
    }
}
