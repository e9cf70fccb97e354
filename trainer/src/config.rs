use std::{
    fmt::{self, Display},
    path::PathBuf,
    str::FromStr,
};

use serde::Deserialize;

use crate::TrainErr;

/// The compute device a trainer places its model on.
///
/// A closed set: config parsing rejects anything it doesn't name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Cpu,
}

impl Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
        }
    }
}

impl FromStr for Device {
    type Err = TrainErr;

    fn from_str(s: &str) -> Result<Self, TrainErr> {
        match s {
            "cpu" => Ok(Device::Cpu),
            other => Err(TrainErr::UnknownDevice(other.to_string())),
        }
    }
}

/// Free-form trainer construction options, all defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Where summaries get persisted. `None` disables persistence.
    pub output_dir: Option<PathBuf>,
    pub device: Device,
    pub distributed: bool,
}

/// The specification for one `build_model` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSpec {
    pub model_type: String,
    pub optimizer: String,
    pub learning_rate: f32,
    pub seed: Option<u64>,
}

impl Default for BuildSpec {
    fn default() -> Self {
        Self {
            model_type: classifier_core::models::DEFAULT_MODEL.to_string(),
            optimizer: "Adam".to_string(),
            learning_rate: 0.001,
            seed: None,
        }
    }
}

/// The closed set of supported optimizers, resolved from a build spec's
/// optimizer identifier before any trainer state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerKind {
    Adam,
}

impl FromStr for OptimizerKind {
    type Err = TrainErr;

    fn from_str(s: &str) -> Result<Self, TrainErr> {
        match s {
            "Adam" => Ok(OptimizerKind::Adam),
            other => Err(TrainErr::UnknownOptimizer(other.to_string())),
        }
    }
}
