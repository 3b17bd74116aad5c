use crate::error::{FarmError, Result};
use crate::policy::DispatchPolicy;
use crate::queue::QueueDiscipline;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FarmConfig {
    pub servers: usize,
    pub policy: DispatchPolicy,
    pub discipline: QueueDiscipline,
    /// Fixed seed for the policy's random source; entropy when unset.
    pub seed: Option<u64>,
    /// Keep every completed job on the dispatcher.
    pub retain_finished: bool,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            servers: 4,
            policy: DispatchPolicy::Random,
            discipline: QueueDiscipline::Fifo,
            seed: None,
            retain_finished: false,
        }
    }
}

impl FarmConfig {
    pub fn new(servers: usize, policy: DispatchPolicy) -> Self {
        Self {
            servers,
            policy,
            ..Self::default()
        }
    }

    pub fn with_discipline(mut self, discipline: QueueDiscipline) -> Self {
        self.discipline = discipline;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn retaining_finished(mut self) -> Self {
        self.retain_finished = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.servers == 0 {
            return Err(FarmError::InvalidConfiguration(
                "server count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shape of the synthetic job stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkloadConfig {
    pub mean_arrival_time: f64,
    pub mean_processing_time: f64,
    pub jobs: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            mean_arrival_time: 3.0,
            mean_processing_time: 100.0,
            jobs: 10_000,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, mean) in [
            ("mean_arrival_time", self.mean_arrival_time),
            ("mean_processing_time", self.mean_processing_time),
        ] {
            if !mean.is_finite() || mean <= 0.0 {
                return Err(FarmError::InvalidConfiguration(format!(
                    "{name} must be a positive number, got {mean}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperimentConfig {
    pub farm: FarmConfig,
    pub workload: WorkloadConfig,
}
