use crate::error::{FarmError, Result};
use crate::policy::DispatchPolicy;
use crate::queue::QueueDiscipline;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

/// Waiting times are recorded in thousandths of a virtual time unit.
const WAIT_SCALE: f64 = 1000.0;
const SIGNIFICANT_FIGURES: u8 = 3;
/// Largest trackable wait in scaled units; anything above saturates.
const HIGHEST_TRACKABLE: u64 = 1 << 50;

pub struct WaitingTimes {
    hist: Histogram<u64>,
}

impl WaitingTimes {
    pub fn new() -> Result<Self> {
        let hist = Histogram::new_with_bounds(1, HIGHEST_TRACKABLE, SIGNIFICANT_FIGURES)
            .map_err(|e| {
                FarmError::InvalidConfiguration(format!("waiting time histogram: {e:?}"))
            })?;
        Ok(Self { hist })
    }

    pub fn record(&mut self, wait: f64) {
        let scaled = (wait.max(0.0) * WAIT_SCALE).round() as u64;
        self.hist.saturating_record(scaled);
    }

    pub fn len(&self) -> u64 {
        self.hist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hist.is_empty()
    }

    pub fn quantile(&self, q: f64) -> f64 {
        self.hist.value_at_quantile(q) as f64 / WAIT_SCALE
    }

    pub fn max(&self) -> f64 {
        self.hist.max() as f64 / WAIT_SCALE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmReport {
    pub policy: DispatchPolicy,
    pub discipline: QueueDiscipline,
    pub servers: usize,
    pub jobs_handled: u64,
    pub jobs_completed: u64,
    pub average_waiting_time: f64,
    pub p50_waiting_time: f64,
    pub p99_waiting_time: f64,
    pub max_waiting_time: f64,
    pub makespan: f64,
}

impl std::fmt::Display for FarmReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Dispatcher: {} ({} servers, {})",
            self.policy, self.servers, self.discipline
        )?;
        writeln!(
            f,
            "Jobs: {} handled, {} completed",
            self.jobs_handled, self.jobs_completed
        )?;
        writeln!(f, "Avg. wait time: {:.4}", self.average_waiting_time)?;
        writeln!(
            f,
            "Wait p50/p99/max: {:.3} / {:.3} / {:.3}",
            self.p50_waiting_time, self.p99_waiting_time, self.max_waiting_time
        )?;
        write!(f, "Makespan: {:.3}", self.makespan)
    }
}
