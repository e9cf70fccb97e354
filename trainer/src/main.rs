use std::{env, fs, num::NonZeroUsize};

use log::info;
use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::Normal;

use classifier_core::dataset::{DataLoader, Dataset};
use trainer::{
    ClassificationTrainer, TrainErr,
    config::{BuildSpec, TrainerConfig},
    summary::EpochRecord,
};

const SEED: u64 = 17;
const EPOCHS: usize = 8;
const CLASSES: usize = 10;
const FEATURES: usize = 784;

/// Synthetic stand-in for a real image set: gaussian noise with a strong
/// class-indicating offset on one feature per class.
fn blobs(n: usize, rng: &mut StdRng) -> Result<Dataset, TrainErr> {
    let noise = Normal::new(0., 1.).expect("unit deviation is valid");
    let mut x = Array2::random_using((n, FEATURES), noise, rng);
    let mut y = Array1::zeros(n);

    for i in 0..n {
        let class = i % CLASSES;
        x[[i, class]] += 6.;
        y[i] = class;
    }

    Ok(Dataset::new(x, y, CLASSES)?)
}

fn main() -> Result<(), TrainErr> {
    env_logger::init();

    let mut config: TrainerConfig = match env::args().nth(1) {
        Some(path) => serde_json::from_slice(&fs::read(path)?)?,
        None => TrainerConfig::default(),
    };
    if let Ok(device) = env::var("DEVICE") {
        config.device = device.parse()?;
    }

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut train_set = blobs(2048, &mut rng)?;
    let valid_set = blobs(512, &mut rng)?;

    let mut trainer = ClassificationTrainer::new(&config);
    trainer.build_model(&BuildSpec {
        model_type: "mlp_mnist".to_string(),
        learning_rate: 0.01,
        seed: Some(SEED),
        ..BuildSpec::default()
    })?;

    let batch_size = NonZeroUsize::new(32).expect("nonzero");
    let mut records = Vec::with_capacity(EPOCHS);

    for epoch in 0..EPOCHS {
        info!("epoch {epoch}");
        train_set.shuffle(&mut rng);

        let train_loader = DataLoader::new(&train_set, batch_size);
        let train = trainer.train_epoch(&train_loader)?;

        let valid_loader = DataLoader::new(&valid_set, batch_size);
        let valid = trainer.evaluate(&valid_loader)?;

        records.push(EpochRecord {
            epoch,
            train,
            valid,
        });
    }

    trainer.base().save_summaries(&records)?;
    Ok(())
}
