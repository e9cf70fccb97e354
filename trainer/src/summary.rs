use serde::Serialize;

/// The record a training epoch returns to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainSummary {
    /// Wall-clock seconds spent in the epoch.
    pub train_time: f64,
    /// Mean loss over the epoch's batches.
    pub train_loss: f32,
}

/// The record an evaluation pass returns to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalSummary {
    /// Wall-clock seconds spent in the pass.
    pub valid_time: f64,
    /// Mean loss over the pass's batches.
    pub valid_loss: f32,
    /// Correct predictions over the sampler's total example count.
    pub valid_acc: f32,
}

/// One epoch's training and validation summaries, flattened for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochRecord {
    pub epoch: usize,
    #[serde(flatten)]
    pub train: TrainSummary,
    #[serde(flatten)]
    pub valid: EvalSummary,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_epoch_record_flattens_to_summary_keys() {
        let record = EpochRecord {
            epoch: 3,
            train: TrainSummary {
                train_time: 1.5,
                train_loss: 0.25,
            },
            valid: EvalSummary {
                valid_time: 0.5,
                valid_loss: 0.5,
                valid_acc: 0.75,
            },
        };

        let value = serde_json::to_value(record).unwrap();
        for key in ["train_time", "train_loss", "valid_time", "valid_loss", "valid_acc"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }
}
