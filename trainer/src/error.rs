use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use classifier_core::MlErr;

/// The result type used in the entire trainer crate.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// The trainer's error type.
#[derive(Debug)]
pub enum TrainErr {
    /// The optimizer identifier is not in the supported set.
    UnknownOptimizer(String),

    /// The device identifier is not in the supported set.
    UnknownDevice(String),

    /// A training or evaluation loop ran before `build_model`.
    ModelNotBuilt,

    /// The data loader yielded zero batches.
    EmptyLoader,

    /// An error bubbled up from the classifier core.
    Ml(MlErr),

    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::UnknownOptimizer(name) => {
                write!(f, "unsupported optimizer {name:?}, only \"Adam\" is recognized")
            }
            TrainErr::UnknownDevice(name) => {
                write!(f, "unknown device {name:?}, only \"cpu\" is recognized")
            }
            TrainErr::ModelNotBuilt => {
                write!(f, "the model is not built yet, call build_model first")
            }
            TrainErr::EmptyLoader => {
                write!(f, "the data loader yielded no batches")
            }
            TrainErr::Ml(e) => write!(f, "{e}"),
            TrainErr::Io(e) => write!(f, "{e}"),
            TrainErr::Json(e) => write!(f, "{e}"),
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::Ml(e) => Some(e),
            TrainErr::Io(e) => Some(e),
            TrainErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for TrainErr {
    fn from(e: MlErr) -> Self {
        TrainErr::Ml(e)
    }
}

impl From<io::Error> for TrainErr {
    fn from(e: io::Error) -> Self {
        TrainErr::Io(e)
    }
}

impl From<serde_json::Error> for TrainErr {
    fn from(e: serde_json::Error) -> Self {
        TrainErr::Json(e)
    }
}
