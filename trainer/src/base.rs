use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use serde::Serialize;

use crate::{Result, config::{Device, TrainerConfig}};

/// Lifecycle scaffolding shared by concrete trainers: device selection, the
/// distributed-mode flag and the output directory.
#[derive(Debug, Clone)]
pub struct BaseTrainer {
    device: Device,
    distributed: bool,
    output_dir: Option<PathBuf>,
}

impl BaseTrainer {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            device: config.device,
            distributed: config.distributed,
            output_dir: config.output_dir.clone(),
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn distributed(&self) -> bool {
        self.distributed
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Persists the collected summaries as JSON under the output directory.
    ///
    /// # Returns
    /// The written path, or `None` when no output directory is configured.
    pub fn save_summaries<S: Serialize>(&self, summaries: &S) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.output_dir else {
            return Ok(None);
        };

        fs::create_dir_all(dir)?;
        let path = dir.join("summaries.json");
        fs::write(&path, serde_json::to_vec_pretty(summaries)?)?;
        info!("wrote summaries to {}", path.display());

        Ok(Some(path))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_output_dir_skips_persistence() {
        let base = BaseTrainer::new(&TrainerConfig::default());
        let written = base.save_summaries(&vec![1, 2, 3]).unwrap();
        assert_eq!(written, None);
    }

    #[test]
    fn test_save_summaries_writes_json() {
        let dir = std::env::temp_dir().join(format!("trainer-test-{}", std::process::id()));
        let config = TrainerConfig {
            output_dir: Some(dir.clone()),
            ..TrainerConfig::default()
        };

        let base = BaseTrainer::new(&config);
        let path = base.save_summaries(&vec![0.5f32]).unwrap().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: Vec<f32> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, [0.5]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
