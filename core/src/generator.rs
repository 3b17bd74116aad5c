use crate::config::WorkloadConfig;
use crate::error::{FarmError, Result};
use crate::job::{Job, JobId};
use rand::prelude::*;
use rand_distr::Exp;

/// Granularity of generated times. Draws are truncated to a multiple of this
/// and never fall below it.
pub const TIME_QUANTUM: f64 = 1.0 / 128.0;

/// Poisson arrivals with exponentially distributed processing demands.
pub struct JobStream {
    arrival_gap: Exp<f64>,
    processing: Exp<f64>,
    rng: StdRng,
    cur_time: f64,
    next_id: JobId,
    remaining: Option<u64>,
}

impl JobStream {
    /// Unbounded stream. The first job arrives at time zero.
    pub fn new(mean_arrival_time: f64, mean_processing_time: f64, rng: StdRng) -> Result<Self> {
        Ok(Self {
            arrival_gap: exponential("mean_arrival_time", mean_arrival_time)?,
            processing: exponential("mean_processing_time", mean_processing_time)?,
            rng,
            cur_time: 0.0,
            next_id: 0,
            remaining: None,
        })
    }

    /// Stream of exactly `config.jobs` jobs.
    pub fn from_config(config: &WorkloadConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut stream = Self::new(config.mean_arrival_time, config.mean_processing_time, rng)?;
        stream.remaining = Some(config.jobs);
        Ok(stream)
    }

    fn draw(&mut self, dist: Exp<f64>) -> f64 {
        let val: f64 = dist.sample(&mut self.rng);
        ((val * 128.0).trunc() / 128.0).max(TIME_QUANTUM)
    }
}

impl Iterator for JobStream {
    type Item = Job;

    fn next(&mut self) -> Option<Job> {
        if let Some(left) = self.remaining.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }
        let needed = self.draw(self.processing);
        let job = Job::new(self.next_id, self.cur_time, needed);
        self.next_id += 1;
        self.cur_time += self.draw(self.arrival_gap);
        Some(job)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(left) => (left as usize, Some(left as usize)),
            None => (usize::MAX, None),
        }
    }
}

fn exponential(name: &str, mean: f64) -> Result<Exp<f64>> {
    if !mean.is_finite() || mean <= 0.0 {
        return Err(FarmError::InvalidConfiguration(format!(
            "{name} must be a positive number, got {mean}"
        )));
    }
    Exp::new(1.0 / mean)
        .map_err(|e| FarmError::InvalidConfiguration(format!("{name}: {e:?}")))
}
