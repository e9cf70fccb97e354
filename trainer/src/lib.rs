pub mod base;
pub mod classifier;
pub mod config;
pub mod error;
pub mod summary;

pub use classifier::ClassificationTrainer;
pub use error::{Result, TrainErr};
