use serde::{Deserialize, Serialize};

pub type JobId = u64;

/// A unit of work with a fixed processing demand and an arrival instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    arrival_time: f64,
    processing_time_needed: f64,
    processing_time_spent: f64,
    finish_time: Option<f64>,
}

impl Job {
    pub fn new(id: JobId, arrival_time: f64, processing_time_needed: f64) -> Self {
        Self {
            id,
            arrival_time,
            processing_time_needed,
            processing_time_spent: 0.0,
            finish_time: None,
        }
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn processing_time_needed(&self) -> f64 {
        self.processing_time_needed
    }

    pub fn processing_time_spent(&self) -> f64 {
        self.processing_time_spent
    }

    pub fn remaining_work(&self) -> f64 {
        self.processing_time_needed - self.processing_time_spent
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_work() <= 0.0
    }

    pub fn finish_time(&self) -> Option<f64> {
        self.finish_time
    }

    /// Arrival-to-completion time. `None` until the job has finished.
    pub fn time_in_queue(&self) -> Option<f64> {
        self.finish_time.map(|t| t - self.arrival_time)
    }

    /// Spends up to `amount` of work starting at `started`, returning what was actually spent.
    pub(crate) fn process(&mut self, amount: f64, started: f64) -> f64 {
        let remaining = self.remaining_work().max(0.0);
        let spent = if amount >= remaining {
            // Land exactly on the demand so no float residue keeps the job alive.
            self.processing_time_spent = self.processing_time_needed;
            remaining
        } else {
            self.processing_time_spent += amount;
            amount
        };
        if self.finish_time.is_none() && self.is_finished() {
            self.finish_time = Some(started + spent);
        }
        spent
    }
}
