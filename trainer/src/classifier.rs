use std::time::Instant;

use log::{debug, info, warn};
use ndarray::ArrayView1;
use rand::{SeedableRng, rngs::StdRng};

use classifier_core::{
    arch::{
        EvalGuard, Sequential,
        loss::{CrossEntropy, LossFn},
    },
    dataset::DataLoader,
    models,
    optimization::{Adam, Optimizer},
};

use crate::{
    Result, TrainErr,
    base::BaseTrainer,
    config::{BuildSpec, OptimizerKind, TrainerConfig},
    summary::{EvalSummary, TrainSummary},
};

const ADAM_BETA1: f32 = 0.9;
const ADAM_BETA2: f32 = 0.999;
const ADAM_EPSILON: f32 = 1e-8;

/// Everything `build_model` produces: the model, its flat parameters, the
/// gradient buffer and the optimizer/loss pair bound to them.
struct BuiltModel {
    model: Sequential,
    params: Vec<f32>,
    grad: Vec<f32>,
    optimizer: Adam,
    loss_fn: CrossEntropy,
}

/// Trainer for an image classification task.
///
/// Owns the model-build step, the per-epoch training loop and the evaluation
/// pass. Batch iteration belongs to the [`DataLoader`]; device and
/// distributed bookkeeping to the [`BaseTrainer`].
pub struct ClassificationTrainer {
    base: BaseTrainer,
    built: Option<BuiltModel>,
}

impl ClassificationTrainer {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            base: BaseTrainer::new(config),
            built: None,
        }
    }

    pub fn base(&self) -> &BaseTrainer {
        &self.base
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Instantiates the model, optimizer and loss function for this trainer.
    ///
    /// The optimizer identifier resolves first, so a failed build leaves the
    /// trainer exactly as it was.
    ///
    /// # Arguments
    /// * `spec` - The model type, optimizer identifier, learning rate and
    ///   optional parameter seed.
    pub fn build_model(&mut self, spec: &BuildSpec) -> Result<()> {
        let kind: OptimizerKind = spec.optimizer.parse()?;
        let model = models::get_model(&spec.model_type)?;

        if self.base.distributed() {
            warn!("distributed flag is set but this build runs single-process");
        }

        let mut rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let params = model.init_params(&mut rng);
        let grad = vec![0.; params.len()];

        let optimizer = match kind {
            OptimizerKind::Adam => Adam::new(
                params.len(),
                spec.learning_rate,
                ADAM_BETA1,
                ADAM_BETA2,
                ADAM_EPSILON,
            ),
        };

        info!(
            "built {} with {} parameters on {}",
            spec.model_type,
            params.len(),
            self.base.device()
        );

        self.built = Some(BuiltModel {
            model,
            params,
            grad,
            optimizer,
            loss_fn: CrossEntropy::new(),
        });

        Ok(())
    }

    /// Trains for one epoch.
    ///
    /// Walks the loader's batches strictly in order; for each one clears the
    /// gradient buffer, runs forward, loss, backward and one optimizer step.
    ///
    /// # Returns
    /// The epoch's wall-clock time and mean batch loss, or `EmptyLoader` when
    /// the loader yields nothing.
    pub fn train_epoch(&mut self, loader: &DataLoader) -> Result<TrainSummary> {
        let built = self.built.as_mut().ok_or(TrainErr::ModelNotBuilt)?;
        built.model.set_training(true);

        let start = Instant::now();
        let mut sum_loss = 0.;
        let mut num_batches = 0;

        for (i, (x, y)) in loader.batches().enumerate() {
            debug!(batch = i; "training batch");

            built.grad.fill(0.);
            let (loss, delta) = {
                let logits = built.model.forward(&built.params, x)?;
                (
                    built.loss_fn.loss(logits, y)?,
                    built.loss_fn.loss_prime(logits, y)?,
                )
            };
            built.model.backward(&built.params, &mut built.grad, delta)?;
            built.optimizer.update_params(&mut built.params, &built.grad)?;

            sum_loss += loss;
            num_batches += 1;
        }

        if num_batches == 0 {
            return Err(TrainErr::EmptyLoader);
        }
        debug!("processed {num_batches} batches");

        let summary = TrainSummary {
            train_time: start.elapsed().as_secs_f64(),
            train_loss: sum_loss / num_batches as f32,
        };
        info!("training loss: {:.3}", summary.train_loss);

        Ok(summary)
    }

    /// Evaluates the model over the loader's batches.
    ///
    /// Runs in scoped evaluation mode, so no gradient bookkeeping happens and
    /// the model comes back in whatever mode it was in. The mean loss divides
    /// by the batch count; accuracy divides by the sampler's total example
    /// count, which may describe a subset that doesn't align with the batches.
    pub fn evaluate(&mut self, loader: &DataLoader) -> Result<EvalSummary> {
        let built = self.built.as_mut().ok_or(TrainErr::ModelNotBuilt)?;
        let mut model = EvalGuard::new(&mut built.model);

        let start = Instant::now();
        let mut sum_loss = 0.;
        let mut num_batches = 0;
        let mut num_correct = 0;

        for (i, (x, y)) in loader.batches().enumerate() {
            debug!(batch = i; "evaluation batch");

            let logits = model.forward(&built.params, x)?;
            sum_loss += built.loss_fn.loss(logits, y)?;
            num_correct += logits
                .outer_iter()
                .zip(y)
                .filter(|&(ref row, &target)| argmax(row.view()) == target)
                .count();
            num_batches += 1;
        }

        if num_batches == 0 {
            return Err(TrainErr::EmptyLoader);
        }

        let summary = EvalSummary {
            valid_time: start.elapsed().as_secs_f64(),
            valid_loss: sum_loss / num_batches as f32,
            valid_acc: num_correct as f32 / loader.sampler().len() as f32,
        };
        info!(
            "validation loss: {:.3} acc: {:.3}",
            summary.valid_loss, summary.valid_acc
        );

        Ok(summary)
    }
}

/// The index of the row's largest logit: the predicted class.
fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &z) in row.iter().enumerate() {
        if z > row[best] {
            best = i;
        }
    }
    best
}
