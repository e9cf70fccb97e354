use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::Result;

/// A classification loss over a batch of logits and class labels.
pub trait LossFn {
    /// The scalar loss averaged over the batch.
    fn loss(&self, logits: ArrayView2<f32>, targets: ArrayView1<usize>) -> Result<f32>;

    /// The loss derivative with respect to each logit.
    fn loss_prime(&self, logits: ArrayView2<f32>, targets: ArrayView1<usize>)
    -> Result<Array2<f32>>;
}
