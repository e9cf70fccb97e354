use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire classifier core.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The classifier core's error type.
#[derive(Debug)]
pub enum MlErr {
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    LabelOutOfRange {
        label: usize,
        classes: usize,
    },
    UnknownModel(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => {
                write!(
                    f,
                    "there's a size mismatch in {what}, got {got} and expected {expected}"
                )
            }
            MlErr::LabelOutOfRange { label, classes } => {
                write!(f, "label {label} is out of range for {classes} classes")
            }
            MlErr::UnknownModel(model_type) => {
                write!(f, "unknown model type {model_type:?}")
            }
        }
    }
}

impl Error for MlErr {}
